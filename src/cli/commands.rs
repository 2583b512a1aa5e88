//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::agent::prompt::{PROMPT_FILENAME, default_prompt_dir};
use crate::agent::{AgentOutcome, ERROR_PREFIX, SqlAgent, write_default_prompt};
use crate::chunking::default_chunker;
use crate::cli::output::{
    OutputFormat, format_columns, format_guard_result, format_index_summary, format_outcome,
    format_run_failure, format_search_results, format_tables,
};
use crate::cli::parser::{Cli, Commands};
use crate::config::{AppConfig, IndexConfig};
use crate::database::{PgExecutor, SqlExecutor, SqlGuard};
use crate::embedding::create_embedder;
use crate::error::{CommandError, Error, Result};
use crate::index::{DocumentIndexer, SchemaIndex};
use crate::llm::OpenAiClient;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success. Interactive commands write to
/// stdout directly and return an empty string.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask { question, trace } => {
            cmd_ask(&cli.app_config(), question, *trace, format).await
        }
        Commands::Chat => cmd_chat(&cli.app_config()).await,
        Commands::Index => cmd_index(&cli.app_config().index, format).await,
        Commands::Search { query, k } => {
            cmd_search(&cli.app_config().index, query, *k, format).await
        }
        Commands::CheckSql { sql } => cmd_check_sql(sql, format),
        Commands::Tables => cmd_tables(&cli.app_config(), format).await,
        Commands::Describe { table } => cmd_describe(&cli.app_config(), table, format).await,
        Commands::InitPrompt { dir } => cmd_init_prompt(dir.as_deref(), format),
    }
}

/// Builds the schema index off the async runtime; embedding is CPU-bound.
async fn build_index(config: &IndexConfig) -> Result<SchemaIndex> {
    let pattern = config.docs_glob.clone();
    tokio::task::spawn_blocking(move || {
        DocumentIndexer::new(default_chunker()).index_glob(&pattern, create_embedder()?)
    })
    .await
    .map_err(|e| Error::InvalidState {
        message: format!("indexing task failed: {e}"),
    })?
}

async fn build_agent(config: &AppConfig) -> Result<SqlAgent> {
    config.warn_missing_credentials();
    let llm = Arc::new(OpenAiClient::new(&config.llm)?);
    let index = build_index(&config.index).await?;
    let executor = Arc::new(PgExecutor::connect_lazy(&config.database)?);
    Ok(SqlAgent::new(
        llm,
        Arc::new(index),
        executor,
        config.agent.clone(),
    ))
}

fn open_executor(config: &AppConfig) -> Result<PgExecutor> {
    config.warn_missing_credentials();
    PgExecutor::connect_lazy(&config.database)
}

async fn cmd_ask(
    config: &AppConfig,
    question: &str,
    trace: bool,
    format: OutputFormat,
) -> Result<String> {
    if question.trim().is_empty() {
        return Err(CommandError::InvalidArgument("question must not be empty".to_string()).into());
    }
    let agent = build_agent(config).await?;
    Ok(ask_reply(agent.run(question).await, trace, format))
}

/// Renders a run for `ask`; a failed run is still an answer.
fn ask_reply(run: Result<AgentOutcome>, trace: bool, format: OutputFormat) -> String {
    match run {
        Ok(outcome) => format_outcome(&outcome, trace, format),
        Err(e) => {
            tracing::error!(error = %e, "agent run failed");
            format_run_failure(&e, format)
        }
    }
}

/// Question to send after a clarification reply.
fn follow_up_question(pending: Option<&str>, reply: &str) -> String {
    pending.map_or_else(
        || reply.to_string(),
        |original| format!("{original}\n\nAdditional detail from the user: {reply}"),
    )
}

fn chat_reply(outcome: &AgentOutcome) -> String {
    outcome.clarification_question().map_or_else(
        || outcome.answer.clone(),
        |question| format!("? {question}"),
    )
}

async fn cmd_chat(config: &AppConfig) -> Result<String> {
    let agent = build_agent(config).await?;
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<String> = None;

    stdout
        .write_all(b"Ask a question about the bank's data. Type 'exit' to quit.\n")
        .await?;
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        let question = follow_up_question(pending.as_deref(), input);
        let reply = match agent.run(&question).await {
            Ok(outcome) => {
                pending = outcome.is_clarification().then(|| question.clone());
                chat_reply(&outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "agent run failed");
                pending = None;
                format!("{ERROR_PREFIX}{e}")
            }
        };
        stdout.write_all(format!("{reply}\n\n").as_bytes()).await?;
    }
    stdout.flush().await?;
    Ok(String::new())
}

async fn cmd_index(config: &IndexConfig, format: OutputFormat) -> Result<String> {
    let index = build_index(config).await?;
    Ok(format_index_summary(&index, &config.docs_glob, format))
}

async fn cmd_search(
    config: &IndexConfig,
    query: &str,
    k: Option<usize>,
    format: OutputFormat,
) -> Result<String> {
    let index = build_index(config).await?;
    let hits = index.search(query, k.unwrap_or(config.top_k))?;
    Ok(format_search_results(&hits, query, format))
}

fn cmd_check_sql(sql: &str, format: OutputFormat) -> Result<String> {
    let verdict = SqlGuard::new()?.validate(sql);
    Ok(format_guard_result(&verdict, format))
}

async fn cmd_tables(config: &AppConfig, format: OutputFormat) -> Result<String> {
    let tables = open_executor(config)?.list_tables().await?;
    Ok(format_tables(&tables, format))
}

async fn cmd_describe(config: &AppConfig, table: &str, format: OutputFormat) -> Result<String> {
    let columns = open_executor(config)?.describe_table(table).await?;
    Ok(format_columns(table, &columns, format))
}

fn cmd_init_prompt(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => default_prompt_dir().ok_or_else(|| Error::Config {
            message: "cannot determine home directory; pass --dir".to_string(),
        })?,
    };
    let path = dir.join(PROMPT_FILENAME);
    let written = write_default_prompt(&dir)?;

    Ok(match format {
        OutputFormat::Text => {
            if written.is_some() {
                format!("Wrote default prompt to {}\n", path.display())
            } else {
                format!("Prompt already exists at {}; not overwritten\n", path.display())
            }
        }
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "path": path,
            "written": written.is_some(),
        }))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AnswerKind;
    use tempfile::TempDir;

    #[test]
    fn test_follow_up_question() {
        assert_eq!(follow_up_question(None, "How many loans?"), "How many loans?");
        let combined = follow_up_question(Some("Show John's loans"), "John Mathew, id 42");
        assert!(combined.starts_with("Show John's loans"));
        assert!(combined.ends_with("John Mathew, id 42"));
    }

    #[test]
    fn test_chat_reply() {
        let outcome = AgentOutcome {
            answer: "CLARIFICATION_NEEDED: Which John?".to_string(),
            kind: AnswerKind::Clarification,
            trace: Vec::new(),
            sql: Vec::new(),
        };
        assert_eq!(chat_reply(&outcome), "? Which John?");
    }

    #[test]
    fn test_ask_reply_turns_run_failure_into_answer() {
        let failed: Result<AgentOutcome> = Err(crate::error::AgentError::StepLimit { max_steps: 8 }.into());
        assert_eq!(
            ask_reply(failed, false, OutputFormat::Text),
            "An error occurred: agent error: no final answer after 8 steps\n"
        );

        let failed: Result<AgentOutcome> = Err(crate::error::LlmError::EmptyResponse.into());
        let json = ask_reply(failed, true, OutputFormat::Json);
        assert!(json.contains("\"answer\": \"An error occurred: llm error: empty response from model\""));
        assert!(json.contains("\"kind\": \"error\""));
    }

    #[test]
    fn test_check_sql() {
        let out = cmd_check_sql("SELECT * FROM loans WHERE deleted_at IS NULL", OutputFormat::Text)
            .unwrap();
        assert!(out.starts_with("allowed:"));
        let out = cmd_check_sql("TRUNCATE loans", OutputFormat::Text).unwrap();
        assert!(out.starts_with("rejected:"));
    }

    #[test]
    fn test_init_prompt() {
        let temp = TempDir::new().unwrap();
        let out = cmd_init_prompt(Some(temp.path()), OutputFormat::Text).unwrap();
        assert!(out.starts_with("Wrote default prompt"));
        let out = cmd_init_prompt(Some(temp.path()), OutputFormat::Json).unwrap();
        assert!(out.contains("\"written\": false"));
    }

    #[tokio::test]
    async fn test_index_command_with_empty_glob() {
        let temp = TempDir::new().unwrap();
        let config = IndexConfig {
            docs_glob: format!("{}/*.txt", temp.path().display()),
            top_k: 4,
        };
        let out = cmd_index(&config, OutputFormat::Text).await.unwrap();
        assert!(out.starts_with("No schema documents matched"));
    }

    #[tokio::test]
    async fn test_ask_rejects_blank_question() {
        let err = cmd_ask(&AppConfig::default(), "  ", false, OutputFormat::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::InvalidArgument(_))));
    }
}
