use crate::error::{Result, TaskboardError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Settings of the board screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardViewConfig {
    /// Prefix of every window title
    pub app_title: String,
    /// Class marking the elements that start a drag
    pub drag_handle_class: String,
    /// Route a board id is appended to when navigating
    pub board_route_prefix: String,
}

impl Default for BoardViewConfig {
    fn default() -> Self {
        Self {
            app_title: "TaskBoard".to_string(),
            drag_handle_class: "drag-handle".to_string(),
            board_route_prefix: "/boards/".to_string(),
        }
    }
}

impl BoardViewConfig {
    /// Loads the configuration from a JSON file; a missing file yields the defaults
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            debug!(path = %path.display(), "No board view config, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).await?;
        serde_json::from_str(&contents)
            .map_err(|err| TaskboardError::ConfigError(format!("{}: {}", path.display(), err)))
    }

    /// Window title for a page, e.g. `TaskBoard - Kanban App`
    pub fn title_for(&self, page: &str) -> String {
        format!("{} - {}", self.app_title, page)
    }

    pub fn board_route(&self, board_id: i64) -> String {
        format!("{}{}", self.board_route_prefix, board_id)
    }
}
