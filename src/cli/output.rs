//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::agent::{AgentOutcome, ERROR_PREFIX};
use crate::database::ColumnInfo;
use crate::error::Error;
use crate::index::{SchemaIndex, ScoredChunk};
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats an agent answer, optionally followed by the tool trace.
#[must_use]
pub fn format_outcome(outcome: &AgentOutcome, trace: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            if let Some(question) = outcome.clarification_question() {
                let _ = writeln!(output, "Clarification needed: {question}");
            } else {
                let _ = writeln!(output, "{}", outcome.answer);
            }
            if trace {
                output.push('\n');
                output.push_str(&format_trace_text(outcome));
            }
            output
        }
        OutputFormat::Json => {
            if trace {
                format_json(outcome)
            } else {
                format_json(&serde_json::json!({
                    "answer": outcome.answer,
                    "kind": outcome.kind,
                }))
            }
        }
    }
}

/// Formats a failed agent run as an answer.
#[must_use]
pub fn format_run_failure(error: &Error, format: OutputFormat) -> String {
    let answer = format!("{ERROR_PREFIX}{error}");
    match format {
        OutputFormat::Text => format!("{answer}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({
            "answer": answer,
            "kind": "error",
        })),
    }
}

fn format_trace_text(outcome: &AgentOutcome) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Trace ({} tool calls):", outcome.trace.len());
    output.push_str(&"-".repeat(60));
    output.push('\n');
    for (step, record) in outcome.trace.iter().enumerate() {
        let status = if record.is_error { " [error]" } else { "" };
        let _ = writeln!(output, "{:>2}. {}{status}", step + 1, record.requested_name);
        let _ = writeln!(output, "    input:  {}", truncate(&record.input, 200));
        let _ = writeln!(output, "    output: {}", truncate(&record.output, 200));
    }
    if !outcome.sql.is_empty() {
        output.push_str("\nSQL:\n");
        for statement in &outcome.sql {
            let _ = writeln!(output, "  {statement}");
        }
    }
    output
}

/// Formats the per-document summary of a built index.
#[must_use]
pub fn format_index_summary(index: &SchemaIndex, pattern: &str, format: OutputFormat) -> String {
    let counts = index.source_counts();
    match format {
        OutputFormat::Text => {
            if index.is_empty() {
                return format!("No schema documents matched \"{pattern}\".\n");
            }
            let mut output = String::new();
            let _ = writeln!(
                output,
                "Indexed {} chunks from {} documents:",
                index.len(),
                counts.len()
            );
            for (source, count) in &counts {
                let _ = writeln!(output, "  {count:>4}  {source}");
            }
            output
        }
        OutputFormat::Json => format_json(&serde_json::json!({
            "pattern": pattern,
            "chunks": index.len(),
            "sources": counts,
        })),
    }
}

/// Formats retrieval results.
#[must_use]
pub fn format_search_results(hits: &[ScoredChunk], query: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if hits.is_empty() {
                return format!("No results found for query: \"{query}\"\n");
            }
            let mut output = String::new();
            let _ = writeln!(output, "Search results for \"{query}\" ({} results):\n", hits.len());
            for (rank, hit) in hits.iter().enumerate() {
                let title = hit.chunk.title.as_deref().unwrap_or("-");
                let _ = writeln!(
                    output,
                    "{:>2}. {:.4}  {}#{}  {}",
                    rank + 1,
                    hit.score,
                    hit.chunk.source,
                    hit.chunk.index,
                    truncate(title, 40)
                );
                let _ = writeln!(output, "    {}", hit.chunk.preview(120).replace('\n', " "));
            }
            output
        }
        OutputFormat::Json => format_json(&serde_json::json!({
            "query": query,
            "count": hits.len(),
            "results": hits,
        })),
    }
}

/// Formats a guard verdict.
#[must_use]
pub fn format_guard_result(verdict: &Result<String, Error>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => match verdict {
            Ok(statement) => format!("allowed: {statement}\n"),
            Err(e) => format!("rejected: {e}\n"),
        },
        OutputFormat::Json => match verdict {
            Ok(statement) => format_json(&serde_json::json!({
                "allowed": true,
                "statement": statement,
            })),
            Err(e) => format_json(&serde_json::json!({
                "allowed": false,
                "reason": e.to_string(),
            })),
        },
    }
}

/// Formats a table list.
#[must_use]
pub fn format_tables(tables: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if tables.is_empty() {
                return "No tables found.\n".to_string();
            }
            tables.iter().fold(String::new(), |mut output, table| {
                let _ = writeln!(output, "{table}");
                output
            })
        }
        OutputFormat::Json => format_json(&tables),
    }
}

/// Formats a table description.
#[must_use]
pub fn format_columns(table: &str, columns: &[ColumnInfo], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if columns.is_empty() {
                return format!("Table \"{table}\" not found.\n");
            }
            let mut output = String::new();
            let _ = writeln!(output, "{table}:");
            let _ = writeln!(output, "{:<32} {:<28} Nullable", "Column", "Type");
            output.push_str(&"-".repeat(70));
            output.push('\n');
            for column in columns {
                let _ = writeln!(
                    output,
                    "{:<32} {:<28} {}",
                    truncate(&column.name, 32),
                    truncate(&column.data_type, 28),
                    if column.nullable { "yes" } else { "no" }
                );
            }
            output
        }
        OutputFormat::Json => format_json(&serde_json::json!({
            "table": table,
            "columns": columns,
        })),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => format_json(&serde_json::json!({
            "error": error.to_string(),
        })),
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Truncates a string to at most `max_chars` characters with ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AnswerKind;
    use crate::core::{ToolCallRecord, ToolKind};
    use crate::error::DatabaseError;

    fn outcome(answer: &str, kind: AnswerKind) -> AgentOutcome {
        AgentOutcome {
            answer: answer.to_string(),
            kind,
            trace: vec![ToolCallRecord {
                tool: ToolKind::RunSqlQuery,
                requested_name: "run_sql_query".to_string(),
                input: r#"{"query":"SELECT 1"}"#.to_string(),
                output: "[]".to_string(),
                is_error: false,
            }],
            sql: vec!["SELECT 1".to_string()],
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("₹₹₹₹₹₹", 5), "₹₹...");
    }

    #[test]
    fn test_format_outcome_text() {
        let text = format_outcome(&outcome("There are 3 loans.", AnswerKind::Answer), false, OutputFormat::Text);
        assert_eq!(text, "There are 3 loans.\n");

        let text = format_outcome(&outcome("There are 3 loans.", AnswerKind::Answer), true, OutputFormat::Text);
        assert!(text.contains("Trace (1 tool calls):"));
        assert!(text.contains("run_sql_query"));
        assert!(text.contains("SQL:\n  SELECT 1"));
    }

    #[test]
    fn test_format_outcome_clarification() {
        let o = outcome("CLARIFICATION_NEEDED: Which branch?", AnswerKind::Clarification);
        let text = format_outcome(&o, false, OutputFormat::Text);
        assert_eq!(text, "Clarification needed: Which branch?\n");

        let json = format_outcome(&o, false, OutputFormat::Json);
        assert!(json.contains("\"kind\": \"clarification\""));
        assert!(json.contains("CLARIFICATION_NEEDED: Which branch?"));
    }

    #[test]
    fn test_format_guard_result() {
        let ok: Result<String, Error> = Ok("SELECT 1".to_string());
        assert_eq!(format_guard_result(&ok, OutputFormat::Text), "allowed: SELECT 1\n");

        let err: Result<String, Error> = Err(DatabaseError::Rejected {
            reason: "keyword DROP is not allowed".to_string(),
        }
        .into());
        let json = format_guard_result(&err, OutputFormat::Json);
        assert!(json.contains("\"allowed\": false"));
        assert!(json.contains("DROP"));
    }

    #[test]
    fn test_format_columns() {
        let columns = vec![ColumnInfo {
            name: "loan_id".to_string(),
            data_type: "uuid".to_string(),
            nullable: false,
        }];
        let text = format_columns("loans", &columns, OutputFormat::Text);
        assert!(text.starts_with("loans:"));
        assert!(text.contains("loan_id"));
        assert_eq!(
            format_columns("ghosts", &[], OutputFormat::Text),
            "Table \"ghosts\" not found.\n"
        );
    }

    #[test]
    fn test_format_error_json() {
        let err = Error::Config {
            message: "bad".to_string(),
        };
        let json = format_error(&err, OutputFormat::Json);
        assert!(json.contains("configuration error: bad"));
    }
}
