//! Tools offered to the model and their dispatch.

use crate::core::{ResultSet, ToolKind};
use crate::database::SqlExecutor;
use crate::error::{AgentError, Error, Result};
use crate::index::SchemaIndex;
use crate::llm::{ToolCall, ToolDefinition};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

/// Marker the clarification tool puts in front of its question.
pub const CLARIFICATION_MARKER: &str = "CLARIFICATION_NEEDED";

/// Prefix of the SQL tool's output when execution fails.
pub const SQL_ERROR_PREFIX: &str = "Error executing query: ";

#[derive(Debug, Deserialize)]
struct QuestionArgs {
    question: String,
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct ReasonArgs {
    reason: String,
}

#[derive(Debug, Deserialize)]
struct TableArgs {
    table_name: String,
}

/// Tool schemas advertised to the model.
///
/// The introspection tools are included only when `schema_tools` is set.
#[must_use]
pub fn tool_definitions(schema_tools: bool) -> Vec<ToolDefinition> {
    let mut tools = vec![
        ToolDefinition {
            name: ToolKind::QueryVecdb.name().to_string(),
            description: "Retrieve the database schema, business rules and join relationships \
                          relevant to the user's question. Always call this before writing SQL."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "question": {"type": "string", "description": "The user's question"}
                },
                "required": ["question"]
            }),
        },
        ToolDefinition {
            name: ToolKind::RunSqlQuery.name().to_string(),
            description: "Execute a read-only PostgreSQL SELECT query and return the rows as JSON."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "A single SELECT statement"}
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: ToolKind::RequestClarification.name().to_string(),
            description: "Ask the user for clarification before generating SQL when the \
                          question is ambiguous."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "reason": {"type": "string", "description": "The question to ask the user"}
                },
                "required": ["reason"]
            }),
        },
    ];

    if schema_tools {
        tools.push(ToolDefinition {
            name: ToolKind::ListTables.name().to_string(),
            description: "List the tables in the public schema.".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        });
        tools.push(ToolDefinition {
            name: ToolKind::GetTableSchema.name().to_string(),
            description: "Describe the columns of a table: name, data type and nullability."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "table_name": {"type": "string", "description": "Table to describe"}
                },
                "required": ["table_name"]
            }),
        });
    }
    tools
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: &str) -> Result<T> {
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(arguments).map_err(|e| {
        AgentError::InvalidArguments {
            tool: tool.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// What a tool handed back.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Text returned to the model.
    pub text: String,
    /// Whether `text` reports a failure.
    pub is_error: bool,
    /// Rows from a successful SQL call.
    pub result: Option<ResultSet>,
    /// SQL the model asked to run, successful or not.
    pub sql: Option<String>,
    /// Whether the model asked the user a question.
    pub clarification: bool,
}

impl ToolOutput {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            ..Self::default()
        }
    }
}

/// Runs tool calls against the index and the database.
pub struct ToolBox {
    index: Arc<SchemaIndex>,
    executor: Arc<dyn SqlExecutor>,
    top_k: usize,
    schema_tools: bool,
}

impl std::fmt::Debug for ToolBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolBox")
            .field("index", &self.index)
            .field("top_k", &self.top_k)
            .field("schema_tools", &self.schema_tools)
            .finish_non_exhaustive()
    }
}

impl ToolBox {
    /// Creates a tool box.
    pub fn new(
        index: Arc<SchemaIndex>,
        executor: Arc<dyn SqlExecutor>,
        top_k: usize,
        schema_tools: bool,
    ) -> Self {
        Self {
            index,
            executor,
            top_k,
            schema_tools,
        }
    }

    /// Runs one tool call. Failures are reported in the output, never raised.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutput {
        let kind = ToolKind::from_name(&call.name);
        tracing::debug!(tool = %call.name, arguments = %call.arguments, "dispatching tool");

        let output = match kind {
            ToolKind::QueryVecdb => self.query_vecdb(&call.arguments),
            ToolKind::RunSqlQuery => self.run_sql_query(&call.arguments).await,
            ToolKind::RequestClarification => Self::request_clarification(&call.arguments),
            ToolKind::ListTables if self.schema_tools => self.list_tables().await,
            ToolKind::GetTableSchema if self.schema_tools => {
                self.get_table_schema(&call.arguments).await
            }
            _ => Err(AgentError::UnknownTool(call.name.clone()).into()),
        };

        output.unwrap_or_else(|e| {
            tracing::warn!(tool = %call.name, error = %e, "tool failed");
            ToolOutput::error(e.to_string())
        })
    }

    fn query_vecdb(&self, arguments: &str) -> Result<ToolOutput> {
        let args: QuestionArgs = parse_args(ToolKind::QueryVecdb.name(), arguments)?;
        let context = self.index.context_for(&args.question, self.top_k)?;
        Ok(ToolOutput::text(context))
    }

    async fn run_sql_query(&self, arguments: &str) -> Result<ToolOutput> {
        let args: QueryArgs = parse_args(ToolKind::RunSqlQuery.name(), arguments)?;
        tracing::info!(sql = %args.query, "generated SQL");

        let output = match self.executor.execute(&args.query).await {
            Ok(result) => ToolOutput {
                text: result.to_json_string(),
                result: Some(result),
                ..ToolOutput::default()
            },
            Err(e) => {
                let message = match e {
                    Error::Database(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                tracing::warn!(error = %message, "query failed");
                ToolOutput::error(format!("{SQL_ERROR_PREFIX}{message}"))
            }
        };
        Ok(ToolOutput {
            sql: Some(args.query),
            ..output
        })
    }

    fn request_clarification(arguments: &str) -> Result<ToolOutput> {
        let args: ReasonArgs = parse_args(ToolKind::RequestClarification.name(), arguments)?;
        Ok(ToolOutput {
            clarification: true,
            ..ToolOutput::text(format!("{CLARIFICATION_MARKER}: {}", args.reason))
        })
    }

    async fn list_tables(&self) -> Result<ToolOutput> {
        let tables = self.executor.list_tables().await?;
        Ok(ToolOutput::text(serde_json::to_string(&tables)?))
    }

    async fn get_table_schema(&self, arguments: &str) -> Result<ToolOutput> {
        let args: TableArgs = parse_args(ToolKind::GetTableSchema.name(), arguments)?;
        let columns = self.executor.describe_table(&args.table_name).await?;
        if columns.is_empty() {
            return Ok(ToolOutput::error(format!(
                "Table '{}' not found in the public schema.",
                args.table_name
            )));
        }
        Ok(ToolOutput::text(serde_json::to_string(&columns)?))
    }
}
