//! Module status records written by the pipeline on module exit.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Completion state reported in the `Status` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompletionState {
    Completed,
    Incomplete,
    /// Any other value, kept verbatim.
    Other(String),
}

impl CompletionState {
    pub fn as_str(&self) -> &str {
        match self {
            CompletionState::Completed => "COMPLETED",
            CompletionState::Incomplete => "INCOMPLETE",
            CompletionState::Other(value) => value,
        }
    }
}

impl From<String> for CompletionState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "COMPLETED" => CompletionState::Completed,
            "INCOMPLETE" => CompletionState::Incomplete,
            _ => CompletionState::Other(value),
        }
    }
}

impl From<CompletionState> for String {
    fn from(value: CompletionState) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CompletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status record for one module run (`QC/<bids_id>_module-<tag>*.json`).
///
/// Numeric fields are kept as raw JSON values so the report can show them
/// exactly as the pipeline wrote them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleStatus {
    #[serde(rename = "Module")]
    pub module: String,
    #[serde(rename = "Status")]
    pub status: CompletionState,
    #[serde(rename = "Progress", default)]
    pub progress: Value,
    #[serde(rename = "Processing.time", default)]
    pub processing_time: Value,
    #[serde(rename = "Threads", default)]
    pub threads: Value,
    #[serde(rename = "micapipeVersion", default)]
    pub pipeline_version: Value,
    #[serde(rename = "Date", default)]
    pub date: Value,
}

impl ModuleStatus {
    /// Returns true when the module finished successfully.
    pub fn is_complete(&self) -> bool {
        self.status == CompletionState::Completed
    }
}

/// Renders a JSON scalar the way it appears in the source file, without
/// quoting strings. `null` renders as `-`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_record() {
        let json = r#"{
            "Module": "Structural connectome",
            "Status": "COMPLETED",
            "Progress": 5,
            "Processing.time": 12.5,
            "Threads": 4,
            "micapipeVersion": "v0.2.0",
            "Date": "2022-09-13"
        }"#;
        let status: ModuleStatus = serde_json::from_str(json).unwrap();
        assert!(status.is_complete());
        assert_eq!(display_value(&status.progress), "5");
        assert_eq!(display_value(&status.processing_time), "12.5");
        assert_eq!(display_value(&status.pipeline_version), "v0.2.0");
    }

    #[test]
    fn unknown_states_are_not_complete() {
        let status: ModuleStatus =
            serde_json::from_str(r#"{"Module": "GD", "Status": "RUNNING"}"#).unwrap();
        assert!(!status.is_complete());
        assert_eq!(status.status, CompletionState::Other("RUNNING".to_string()));
        assert_eq!(display_value(&status.threads), "-");
    }
}
