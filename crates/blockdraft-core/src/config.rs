//! Editor configuration.

use crate::error::EditorResult;
use crate::layout::Container;
use serde::{Deserialize, Serialize};

/// Default snap distance in pixels.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 5.0;

/// Tunables for an [`Editor`](crate::editor::Editor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// A candidate snaps when strictly closer than this.
    pub snap_tolerance: f64,
    /// Maximum number of undo entries kept. `None` keeps everything.
    pub history_limit: Option<usize>,
    /// Container size for a new, empty layout.
    pub container: Container,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            history_limit: None,
            container: Container::default(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
