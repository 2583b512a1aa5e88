//! Tool call records kept for one agent run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tools the agent can offer to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Similarity lookup over the schema documentation.
    QueryVecdb,
    /// Read-only SQL execution.
    RunSqlQuery,
    /// Ask the user for more information.
    RequestClarification,
    /// List tables in the public schema.
    ListTables,
    /// Describe the columns of one table.
    GetTableSchema,
    /// A name the model made up.
    Unknown,
}

impl ToolKind {
    /// All registered tools, in the order they are offered to the model.
    pub const ALL: [Self; 5] = [
        Self::QueryVecdb,
        Self::RunSqlQuery,
        Self::RequestClarification,
        Self::ListTables,
        Self::GetTableSchema,
    ];

    /// Wire name used in the tool schema.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::QueryVecdb => "query_vecdb",
            Self::RunSqlQuery => "run_sql_query",
            Self::RequestClarification => "request_clarification",
            Self::ListTables => "list_tables",
            Self::GetTableSchema => "get_table_schema",
            Self::Unknown => "unknown",
        }
    }

    /// Resolves a wire name; unrecognised names map to [`ToolKind::Unknown`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One tool invocation within an agent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Which tool was called.
    pub tool: ToolKind,
    /// Name the model used (differs from `tool.name()` for unknown tools).
    pub requested_name: String,
    /// Raw JSON arguments from the model.
    pub input: String,
    /// Text returned to the model.
    pub output: String,
    /// Whether the output reports a failure.
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), kind);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(ToolKind::from_name("drop_everything"), ToolKind::Unknown);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ToolKind::RunSqlQuery).unwrap();
        assert_eq!(json, "\"run_sql_query\"");
    }
}
