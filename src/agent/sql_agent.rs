//! The tool-calling loop.

use super::prompt::SYSTEM_PROMPT;
use super::tools::{CLARIFICATION_MARKER, ToolBox, tool_definitions};
use crate::core::{ResultSet, ToolCallRecord, ToolKind};
use crate::database::SqlExecutor;
use crate::error::{AgentError, LlmError, Result};
use crate::format::ResultFormatter;
use crate::index::{DEFAULT_TOP_K, SchemaIndex};
use crate::llm::{ChatMessage, LlmClient};
use serde::Serialize;
use std::sync::Arc;

/// Prefix of the answer returned by [`SqlAgent::invoke`] when a run fails.
pub const ERROR_PREFIX: &str = "An error occurred: ";

/// Default number of model turns before giving up.
pub const DEFAULT_MAX_STEPS: usize = 8;

/// Agent settings.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Chunks returned by `query_vecdb`.
    pub top_k: usize,
    /// Model turns allowed per run.
    pub max_steps: usize,
    /// Offer `list_tables` and `get_table_schema`.
    pub schema_tools: bool,
    /// Render the last SQL result through the formatter instead of using
    /// the model's own final text.
    pub render_results: bool,
    /// System prompt.
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_steps: DEFAULT_MAX_STEPS,
            schema_tools: true,
            render_results: true,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

/// What kind of answer a run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    /// A final answer to the question.
    Answer,
    /// A question back to the user.
    Clarification,
}

/// Result of one agent run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    /// Text for the user.
    pub answer: String,
    /// Answer or clarification.
    pub kind: AnswerKind,
    /// Every tool call, in order.
    pub trace: Vec<ToolCallRecord>,
    /// SQL statements the model ran.
    pub sql: Vec<String>,
}

impl AgentOutcome {
    /// The question for the user, without the clarification marker.
    ///
    /// Returns `None` for regular answers.
    #[must_use]
    pub fn clarification_question(&self) -> Option<&str> {
        if self.kind != AnswerKind::Clarification {
            return None;
        }
        let after = self
            .answer
            .find(CLARIFICATION_MARKER)
            .map_or(self.answer.as_str(), |pos| {
                &self.answer[pos + CLARIFICATION_MARKER.len()..]
            });
        Some(after.trim_start_matches(':').trim())
    }

    /// Whether the run ended by asking the user a question.
    #[must_use]
    pub fn is_clarification(&self) -> bool {
        self.kind == AnswerKind::Clarification
    }
}

/// Retrieval-augmented SQL agent.
///
/// Sends the question to the model with the tool schema, runs the tools the
/// model asks for, and repeats until the model answers or asks the user for
/// clarification.
pub struct SqlAgent {
    llm: Arc<dyn LlmClient>,
    tools: ToolBox,
    formatter: ResultFormatter,
    config: AgentConfig,
}

impl std::fmt::Debug for SqlAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlAgent")
            .field("llm", &self.llm.name())
            .field("tools", &self.tools)
            .field("max_steps", &self.config.max_steps)
            .finish_non_exhaustive()
    }
}

impl SqlAgent {
    /// Creates an agent.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        index: Arc<SchemaIndex>,
        executor: Arc<dyn SqlExecutor>,
        config: AgentConfig,
    ) -> Self {
        let tools = ToolBox::new(index, executor, config.top_k, config.schema_tools);
        Self {
            formatter: ResultFormatter::new(Arc::clone(&llm)),
            llm,
            tools,
            config,
        }
    }

    /// Agent settings.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Answers a question.
    ///
    /// # Errors
    ///
    /// Returns an error if a model call fails, the formatter fails, or no
    /// final answer arrives within `max_steps` turns. Tool failures are not
    /// errors; they are reported back to the model.
    pub async fn run(&self, question: &str) -> Result<AgentOutcome> {
        let definitions = tool_definitions(self.config.schema_tools);
        let mut messages = vec![
            ChatMessage::system(self.config.system_prompt.as_str()),
            ChatMessage::user(question),
        ];
        let mut trace = Vec::new();
        let mut sql = Vec::new();
        let mut last_result: Option<ResultSet> = None;

        for step in 0..self.config.max_steps {
            let response = self.llm.complete(&messages, &definitions).await?;
            tracing::debug!(
                step,
                tool_calls = response.tool_calls.len(),
                finish_reason = ?response.finish_reason,
                "model turn"
            );

            if !response.has_tool_calls() {
                let text = response.content.unwrap_or_default();
                return self.finish(question, text, trace, sql, last_result).await;
            }

            messages.push(ChatMessage::assistant(
                response.content.clone().unwrap_or_default(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let tool = ToolKind::from_name(&call.name);
                let output = self.tools.dispatch(call).await;
                trace.push(ToolCallRecord {
                    tool,
                    requested_name: call.name.clone(),
                    input: call.arguments.clone(),
                    output: output.text.clone(),
                    is_error: output.is_error,
                });
                if let Some(statement) = output.sql {
                    sql.push(statement);
                }
                if output.clarification || output.text.contains(CLARIFICATION_MARKER) {
                    tracing::debug!(step, tool = tool.name(), "clarification requested");
                    return Ok(AgentOutcome {
                        answer: output.text,
                        kind: AnswerKind::Clarification,
                        trace,
                        sql,
                    });
                }
                // Only the latest query counts; a failed one leaves nothing to render.
                if tool == ToolKind::RunSqlQuery {
                    last_result = output.result;
                }
                messages.push(ChatMessage::tool(call.id.as_str(), output.text));
            }
        }

        Err(AgentError::StepLimit {
            max_steps: self.config.max_steps,
        }
        .into())
    }

    async fn finish(
        &self,
        question: &str,
        text: String,
        trace: Vec<ToolCallRecord>,
        sql: Vec<String>,
        last_result: Option<ResultSet>,
    ) -> Result<AgentOutcome> {
        if text.contains(CLARIFICATION_MARKER) {
            return Ok(AgentOutcome {
                answer: text,
                kind: AnswerKind::Clarification,
                trace,
                sql,
            });
        }

        let answer = match last_result {
            Some(result) if self.config.render_results => {
                self.formatter.format(question, &result).await?
            }
            _ if text.trim().is_empty() => return Err(LlmError::EmptyResponse.into()),
            _ => text,
        };

        Ok(AgentOutcome {
            answer,
            kind: AnswerKind::Answer,
            trace,
            sql,
        })
    }

    /// Answers a question; failures come back as `"An error occurred: …"`.
    pub async fn invoke(&self, question: &str) -> String {
        match self.run(question).await {
            Ok(outcome) => outcome.answer,
            Err(e) => {
                tracing::error!(error = %e, "agent run failed");
                format!("{ERROR_PREFIX}{e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(answer: &str, kind: AnswerKind) -> AgentOutcome {
        AgentOutcome {
            answer: answer.to_string(),
            kind,
            trace: Vec::new(),
            sql: Vec::new(),
        }
    }

    #[test]
    fn test_clarification_question_strips_marker() {
        let o = outcome("CLARIFICATION_NEEDED: Which John do you mean?", AnswerKind::Clarification);
        assert_eq!(o.clarification_question(), Some("Which John do you mean?"));
        assert!(o.is_clarification());
    }

    #[test]
    fn test_clarification_question_marker_mid_text() {
        let o = outcome(
            "I need more detail. CLARIFICATION_NEEDED: Which period?",
            AnswerKind::Clarification,
        );
        assert_eq!(o.clarification_question(), Some("Which period?"));
    }

    #[test]
    fn test_clarification_question_for_answer() {
        let o = outcome("There are 100 customers.", AnswerKind::Answer);
        assert_eq!(o.clarification_question(), None);
    }

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.top_k, 4);
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
        assert!(config.schema_tools);
        assert!(config.render_results);
    }

    #[test]
    fn test_outcome_serializes_kind() {
        let json = serde_json::to_value(outcome("x", AnswerKind::Clarification)).unwrap();
        assert_eq!(json["kind"], "clarification");
    }
}
