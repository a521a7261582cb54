/// Tool usage log model
///
/// One record per successful tool invocation made through the HTTP API,
/// stored in the `tool_logs` collection. `user_id` is set when the request
/// carried a valid bearer token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tools::Tool;

/// A tool invocation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolLog {
    /// Caller, if authenticated (hex ObjectId)
    pub user_id: Option<String>,

    /// Tool identifier, e.g. `caesar`
    pub tool_name: String,

    /// When the invocation finished
    pub timestamp: DateTime<Utc>,

    /// Arguments passed to the tool
    pub input: String,

    /// Serialized tool result
    pub output: String,
}

impl ToolLog {
    pub fn new(
        user_id: Option<String>,
        tool: Tool,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            tool_name: tool.as_str().to_string(),
            timestamp: Utc::now(),
            input: input.into(),
            output: output.into(),
        }
    }
}
