//! Per-instance configuration.

use bindy_core::{BindyError, BindyResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservableConfig {
    /// Stamp a private copy of triggered payloads instead of the payload the
    /// host passes around. Needed whenever the host reuses one payload object
    /// for every handler of a firing (the in-memory host does).
    pub isolate_triggered_payloads: bool,
}

impl Default for ObservableConfig {
    fn default() -> Self {
        Self {
            isolate_triggered_payloads: true,
        }
    }
}

impl ObservableConfig {
    /// Read a config document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> BindyResult<Self> {
        serde_json::from_str(json).map_err(|e| BindyError::invalid_config(e.to_string()))
    }
}
