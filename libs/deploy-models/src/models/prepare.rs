//! Results of package uploads

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Log line emitted by the control plane while handling an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLinePrepareResponse {
    /// Epoch timestamp in milliseconds
    #[serde(default)]
    pub time: i64,

    /// Severity, e.g. `info` or `warning`
    #[serde(default)]
    pub level: String,

    #[serde(default)]
    pub message: String,
}

impl LogLinePrepareResponse {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.time).single()
    }
}

/// Outcome of uploading a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareResult {
    /// Session id (config server) or run id (controller)
    pub id: i64,

    pub log_lines: Vec<LogLinePrepareResponse>,
}
