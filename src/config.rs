use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{EngineError, EngineResult};

const DEFAULT_TREE_UNSEEN_THRESHOLD: usize = 12;
const DEFAULT_MAX_TREE_NODES: usize = 400_000;
const DEFAULT_STARVATION_BLOCKED_THRESHOLD: usize = 1;

/// Tunables for one engine session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The guess tree is only built while fewer tiles than this are unseen.
    pub tree_unseen_threshold: usize,
    /// A build growing past this many nodes is abandoned.
    pub max_tree_nodes: usize,
    /// Reconciliation prefers the starvation move when more opponents than
    /// this are blocked on the partner-aware move's pip.
    pub starvation_blocked_threshold: usize,
    pub use_endgame_solver: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tree_unseen_threshold: DEFAULT_TREE_UNSEEN_THRESHOLD,
            max_tree_nodes: DEFAULT_MAX_TREE_NODES,
            starvation_blocked_threshold: DEFAULT_STARVATION_BLOCKED_THRESHOLD,
            use_endgame_solver: true,
        }
    }
}

impl EngineConfig {
    /// Heuristics only.
    pub fn without_solver() -> Self {
        Self {
            use_endgame_solver: false,
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> EngineResult<Self> {
        serde_json::from_str(raw).map_err(|e| EngineError::config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| EngineError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"max_tree_nodes": 1000}"#).unwrap();
        assert_eq!(config.max_tree_nodes, 1000);
        assert_eq!(config.tree_unseen_threshold, DEFAULT_TREE_UNSEEN_THRESHOLD);
        assert!(config.use_endgame_solver);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(EngineError::Config { .. })
        ));
        assert!(matches!(
            EngineConfig::from_json_file("/nonexistent/engine.json"),
            Err(EngineError::Config { .. })
        ));
    }
}
