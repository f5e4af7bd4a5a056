use std::collections::BTreeMap;

use crate::finding::{Finding, Severity};
use crate::rules::{EngineConfig, RuleToggle, registry};

/// In-memory UI state coupling the diagram to the results list. Created at
/// session start with every known rule enabled and nothing selected;
/// mutated only through the transition methods below; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    selected_node: Option<String>,
    group_by_severity: bool,
    enabled_rules: BTreeMap<&'static str, bool>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            selected_node: None,
            group_by_severity: false,
            enabled_rules: registry().all().iter().map(|rule| (rule.id, true)).collect(),
        }
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    pub fn group_by_severity(&self) -> bool {
        self.group_by_severity
    }

    /// Selecting the same node again is a no-op, not a toggle.
    pub fn select_node(&mut self, id: &str) {
        if self.selected_node.as_deref() != Some(id) {
            self.selected_node = Some(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_node = None;
    }

    pub fn toggle_grouping(&mut self) {
        self.group_by_severity = !self.group_by_severity;
    }

    /// Flips one rule. Unknown ids are ignored; the known-rule set is fixed
    /// by the registry.
    pub fn toggle_rule(&mut self, id: &str) {
        if let Some(enabled) = self.enabled_rules.get_mut(id) {
            *enabled = !*enabled;
        }
    }

    pub fn toggle_all(&mut self, enable: bool) {
        for enabled in self.enabled_rules.values_mut() {
            *enabled = enable;
        }
    }

    pub fn is_rule_enabled(&self, id: &str) -> bool {
        self.enabled_rules.get(id).copied().unwrap_or(false)
    }

    pub fn enabled_rule_count(&self) -> usize {
        self.enabled_rules.values().filter(|on| **on).count()
    }

    /// Findings currently shown: the selected node's when a selection is
    /// active, otherwise all of them. Input order is preserved.
    pub fn displayed_findings<'a>(&self, findings: &'a [Finding]) -> Vec<&'a Finding> {
        match self.selected_node.as_deref() {
            Some(selected) => findings
                .iter()
                .filter(|f| f.node_id.as_deref() == Some(selected))
                .collect(),
            None => findings.iter().collect(),
        }
    }

    /// Displayed findings partitioned into severity buckets, most severe
    /// first, empty buckets omitted. Bucket order is fixed regardless of
    /// which buckets exist.
    pub fn grouped_findings<'a>(
        &self,
        findings: &'a [Finding],
    ) -> Vec<(Severity, Vec<&'a Finding>)> {
        let displayed = self.displayed_findings(findings);
        Severity::ORDERED
            .iter()
            .filter_map(|&severity| {
                let bucket: Vec<&Finding> = displayed
                    .iter()
                    .copied()
                    .filter(|f| f.severity == severity)
                    .collect();
                (!bucket.is_empty()).then_some((severity, bucket))
            })
            .collect()
    }

    /// Translates the short-id rule toggles into the technical-name-keyed
    /// shape the rule engine's `evaluate` consumes.
    pub fn engine_config(&self) -> EngineConfig {
        self.enabled_rules
            .iter()
            .filter_map(|(id, &enabled)| {
                registry()
                    .by_id(id)
                    .map(|rule| (rule.technical_name, RuleToggle { enabled }))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::finding;

    fn sample_findings() -> Vec<Finding> {
        vec![
            finding("E01", Severity::Must, Some("a")),
            finding("T01", Severity::Should, Some("b")),
            finding("N01", Severity::Nit, Some("b")),
            finding("R01", Severity::Should, None),
        ]
    }

    #[test]
    fn starts_with_everything_enabled_and_nothing_selected() {
        let state = ViewState::new();
        assert_eq!(state.selected_node(), None);
        assert!(!state.group_by_severity());
        assert_eq!(state.enabled_rule_count(), registry().len());
    }

    #[test]
    fn selection_filters_and_clear_restores() {
        let findings = sample_findings();
        let mut state = ViewState::new();
        assert_eq!(state.displayed_findings(&findings).len(), findings.len());

        state.select_node("b");
        let shown = state.displayed_findings(&findings);
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|f| f.node_id.as_deref() == Some("b")));

        state.select_node("b"); // idempotent
        assert_eq!(state.selected_node(), Some("b"));

        state.clear_selection();
        assert_eq!(state.displayed_findings(&findings).len(), findings.len());
    }

    #[test]
    fn grouping_buckets_come_in_severity_order() {
        let findings = sample_findings();
        let mut state = ViewState::new();
        state.toggle_grouping();
        assert!(state.group_by_severity());

        let grouped = state.grouped_findings(&findings);
        let order: Vec<Severity> = grouped.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, vec![Severity::Must, Severity::Should, Severity::Nit]);
        assert_eq!(grouped[1].1.len(), 2);
    }

    #[test]
    fn empty_buckets_are_omitted_but_order_is_fixed() {
        let findings = vec![
            finding("N01", Severity::Nit, None),
            finding("E01", Severity::Must, None),
        ];
        let state = ViewState::new();
        let grouped = state.grouped_findings(&findings);
        let order: Vec<Severity> = grouped.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, vec![Severity::Must, Severity::Nit]);
    }

    #[test]
    fn grouping_respects_selection() {
        let findings = sample_findings();
        let mut state = ViewState::new();
        state.select_node("b");
        let grouped = state.grouped_findings(&findings);
        let order: Vec<Severity> = grouped.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, vec![Severity::Should, Severity::Nit]);
    }

    #[test]
    fn toggle_all_round_trips() {
        let mut state = ViewState::new();
        state.toggle_all(false);
        assert_eq!(state.enabled_rule_count(), 0);
        state.toggle_all(true);
        assert_eq!(state.enabled_rule_count(), registry().len());
        assert!(
            registry()
                .all()
                .iter()
                .all(|rule| state.is_rule_enabled(rule.id))
        );
    }

    #[test]
    fn toggle_rule_flips_only_that_rule() {
        let mut state = ViewState::new();
        state.toggle_rule("E01");
        assert!(!state.is_rule_enabled("E01"));
        assert!(state.is_rule_enabled("E02"));
        state.toggle_rule("E01");
        assert!(state.is_rule_enabled("E01"));
        state.toggle_rule("Z99"); // unknown id: ignored
        assert_eq!(state.enabled_rule_count(), registry().len());
    }

    #[test]
    fn engine_config_is_keyed_by_technical_name() {
        let mut state = ViewState::new();
        state.toggle_rule("C01");
        let config = state.engine_config();
        assert_eq!(config.len(), registry().len());
        assert_eq!(
            config.get("hardcoded_credentials"),
            Some(&RuleToggle { enabled: false })
        );
        assert_eq!(
            config.get("missing_error_handling"),
            Some(&RuleToggle { enabled: true })
        );
    }
}
