//! Library configuration

use serde::{Deserialize, Serialize};

/// Configuration for a bound `Q` instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QConfig {
    /// Name reserved in the window namespace
    pub alias: String,
    /// Skip reserving the alias (embedding several instances in one page)
    pub register_alias: bool,
    /// Prefix that turns a data key into an attribute name
    pub data_prefix: String,
    /// `display` value forced by `show`
    pub show_display: String,
}

impl Default for QConfig {
    fn default() -> Self {
        Self {
            alias: "Q".to_string(),
            register_alias: true,
            data_prefix: "data-".to_string(),
            show_display: "block".to_string(),
        }
    }
}
