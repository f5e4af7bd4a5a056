use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Spacing constants for the layered layout. Deliberately independent of
/// node content so output stays deterministic and testable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fixed bounding box allocated per node, in design units.
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between nodes within one rank (vertical in LR orientation).
    pub node_spacing: f32,
    /// Gap between adjacent ranks (horizontal in LR orientation).
    pub rank_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Down/up sweeps of the median ordering heuristic.
    pub ordering_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 80.0,
            node_spacing: 80.0,
            rank_spacing: 120.0,
            margin_x: 20.0,
            margin_y: 20.0,
            ordering_passes: 4,
        }
    }
}

/// Loads a layout config from a JSON file, falling back to defaults when no
/// path is given. Missing fields take their default values.
pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: LayoutConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: LayoutConfig = serde_json::from_str(r#"{"node_spacing": 40.0}"#).unwrap();
        assert_eq!(config.node_spacing, 40.0);
        assert_eq!(config.node_width, LayoutConfig::default().node_width);
        assert_eq!(config.ordering_passes, 4);
    }
}
