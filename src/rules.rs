use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::finding::Severity;

/// One lint rule as surfaced to the UI: a short display id, the technical
/// name the rule engine keys its config by, and display metadata.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub technical_name: &'static str,
    pub severity: Severity,
    pub summary: &'static str,
}

const RULES: &[RuleInfo] = &[
    RuleInfo {
        id: "E01",
        technical_name: "missing_error_handling",
        severity: Severity::Must,
        summary: "Workflow has no error trigger or error branch",
    },
    RuleInfo {
        id: "E02",
        technical_name: "continue_on_fail_enabled",
        severity: Severity::Should,
        summary: "Node silently continues on failure",
    },
    RuleInfo {
        id: "C01",
        technical_name: "hardcoded_credentials",
        severity: Severity::Must,
        summary: "Credential material embedded in node parameters",
    },
    RuleInfo {
        id: "C02",
        technical_name: "plaintext_secret_in_params",
        severity: Severity::Must,
        summary: "Secret-looking value stored in plain text",
    },
    RuleInfo {
        id: "R01",
        technical_name: "retry_disabled_on_network_node",
        severity: Severity::Should,
        summary: "Network-bound node runs without retries",
    },
    RuleInfo {
        id: "R02",
        technical_name: "unbounded_retry_loop",
        severity: Severity::Should,
        summary: "Retry configuration has no upper bound",
    },
    RuleInfo {
        id: "T01",
        technical_name: "missing_timeout",
        severity: Severity::Should,
        summary: "Long-running node has no timeout branch",
    },
    RuleInfo {
        id: "N01",
        technical_name: "default_node_name",
        severity: Severity::Nit,
        summary: "Node still carries its auto-generated name",
    },
    RuleInfo {
        id: "N02",
        technical_name: "unconnected_node",
        severity: Severity::Nit,
        summary: "Node is not connected to the rest of the workflow",
    },
];

/// Bidirectional id/technical-name lookup, built once and validated for
/// uniqueness in both directions. A duplicate entry is a programming error
/// and panics at first access, which any test run surfaces immediately.
pub struct RuleRegistry {
    rules: &'static [RuleInfo],
    by_id: HashMap<&'static str, &'static RuleInfo>,
    by_technical_name: HashMap<&'static str, &'static RuleInfo>,
}

impl RuleRegistry {
    fn build(rules: &'static [RuleInfo]) -> Self {
        let mut by_id = HashMap::with_capacity(rules.len());
        let mut by_technical_name = HashMap::with_capacity(rules.len());
        for rule in rules {
            if by_id.insert(rule.id, rule).is_some() {
                panic!("duplicate rule id {:?}", rule.id);
            }
            if by_technical_name.insert(rule.technical_name, rule).is_some() {
                panic!("duplicate technical rule name {:?}", rule.technical_name);
            }
        }
        Self {
            rules,
            by_id,
            by_technical_name,
        }
    }

    pub fn by_id(&self, id: &str) -> Option<&'static RuleInfo> {
        self.by_id.get(id).copied()
    }

    pub fn by_technical_name(&self, name: &str) -> Option<&'static RuleInfo> {
        self.by_technical_name.get(name).copied()
    }

    /// All rules in catalog order.
    pub fn all(&self) -> &'static [RuleInfo] {
        self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

static REGISTRY: Lazy<RuleRegistry> = Lazy::new(|| RuleRegistry::build(RULES));

pub fn registry() -> &'static RuleRegistry {
    &REGISTRY
}

/// Per-rule toggle in the shape the rule engine's `evaluate` consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuleToggle {
    pub enabled: bool,
}

/// Engine-facing config: technical rule name to toggle. Built from the
/// view state before each evaluation call, so disabling a rule prevents its
/// findings from being generated rather than hiding them afterwards.
pub type EngineConfig = BTreeMap<&'static str, RuleToggle>;
