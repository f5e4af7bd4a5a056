use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key under which findings without a node attribution are grouped.
pub const UNKNOWN_NODE_KEY: &str = "unknown";

/// Diagnostic level, most severe first. This is the single source of the
/// severity order; max-severity, grouping order and badge styling all go
/// through it rather than comparing strings at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Must,
    Should,
    Nit,
}

impl Severity {
    /// All severities, in display order (most severe first).
    pub const ORDERED: [Severity; 3] = [Severity::Must, Severity::Should, Severity::Nit];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Must => "must",
            Severity::Should => "should",
            Severity::Nit => "nit",
        }
    }

    fn weight(self) -> u8 {
        match self {
            Severity::Must => 0,
            Severity::Should => 1,
            Severity::Nit => 2,
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Must sorts first.
        self.weight().cmp(&other.weight())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// One lint diagnostic from the rule engine, optionally attributed to a
/// node. An out-of-set severity string fails deserialization here, at the
/// engine boundary, so malformed levels can never reach a count bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub path: String,
    pub line: u64,
    #[serde(rename = "nodeId", default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_details: Option<String>,
}

/// Per-severity counts. `total` always equals the input length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub must: usize,
    pub should: usize,
    pub nit: usize,
    pub total: usize,
}

/// Groups findings by node id, preserving input order within each group.
/// Findings without a node id group under [`UNKNOWN_NODE_KEY`]; findings
/// whose node id does not exist in the graph still get their own group —
/// whether to render those is the caller's call.
pub fn group_by_node(findings: &[Finding]) -> BTreeMap<&str, Vec<&Finding>> {
    let mut groups: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
    for finding in findings {
        let key = finding.node_id.as_deref().unwrap_or(UNKNOWN_NODE_KEY);
        groups.entry(key).or_default().push(finding);
    }
    groups
}

/// Most severe level present, `None` on empty input. Short-circuits as soon
/// as a `must` shows up.
pub fn max_severity(findings: &[Finding]) -> Option<Severity> {
    let mut max: Option<Severity> = None;
    for finding in findings {
        if finding.severity == Severity::Must {
            return Some(Severity::Must);
        }
        max = Some(match max {
            Some(current) => current.min(finding.severity),
            None => finding.severity,
        });
    }
    max
}

/// Tallies findings per severity. The match is exhaustive so a future
/// severity variant cannot silently vanish from the buckets.
pub fn counts_by_severity(findings: &[Finding]) -> SeverityCounts {
    let mut counts = SeverityCounts {
        total: findings.len(),
        ..SeverityCounts::default()
    };
    for finding in findings {
        match finding.severity {
            Severity::Must => counts.must += 1,
            Severity::Should => counts.should += 1,
            Severity::Nit => counts.nit += 1,
        }
    }
    counts
}

#[cfg(test)]
pub(crate) fn finding(rule: &str, severity: Severity, node_id: Option<&str>) -> Finding {
    Finding {
        rule: rule.to_string(),
        severity,
        message: format!("{rule} fired"),
        path: "workflow.json".to_string(),
        line: 1,
        node_id: node_id.map(str::to_string),
        raw_details: None,
    }
}
