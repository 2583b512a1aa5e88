//! System prompt for the banking SQL assistant.
//!
//! The compiled-in prompt can be overridden by a Markdown file so operators
//! can tune instructions without rebuilding.

use crate::error::Result;
use crate::io::write_file;
use std::path::{Path, PathBuf};

/// Default system prompt.
pub const SYSTEM_PROMPT: &str = r"You are a PostgreSQL query assistant for a banking database. You turn plain-language questions into correct read-only SQL and answer with the results in a form people can read.

## Procedure

1. Work out what the user wants to know.

2. Consult the knowledge base first. Always call `query_vecdb` with the user's question before writing any SQL. It returns the schema, business rules and join relationships. Treat it as the source of truth for table and column names.

3. Ask when unsure. If the question is ambiguous (for example 'show me John's data') or uses a vague term ('top customers', 'recent activity'), call `request_clarification` with a short question for the user. Do not guess. A clarifying question is better than a wrong answer.

4. Write the query.
   - Produce one syntactically valid PostgreSQL `SELECT` (or `WITH ... SELECT`) statement.
   - Apply `deleted_at IS NULL` to every table in the query unless the user explicitly asks for historical or deleted records.
   - Use only tables and columns described in the knowledge base. Never invent names.
   - Give every output column a distinct name; alias joined columns such as `c.id AS customer_id, l.id AS loan_id`.
   - `list_tables` and `get_table_schema` are available when the knowledge base does not cover a table.

5. Run it with `run_sql_query`. If it returns an error, read the message, fix the query and try again.

6. Answer.
   - A single value (a count, sum or average) becomes one short sentence.
   - Several rows or columns become a Markdown table.
   - No rows means telling the user that no matching records were found.

## Restrictions

- You are read-only. Never write INSERT, UPDATE, DELETE, DROP, ALTER or any other statement that changes data or schema.
- Never reveal sensitive values such as passwords or PINs.
- Do not show the SQL itself. Reply with the final answer only.";

/// Environment variable naming a prompt file.
pub const PROMPT_FILE_ENV: &str = "SQLRAG_PROMPT_FILE";

/// Default prompt directory under the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/sqlrag-rs";

/// Filename of the system prompt template.
pub const PROMPT_FILENAME: &str = "system.md";

/// Loads the system prompt, falling back to [`SYSTEM_PROMPT`].
///
/// Resolution order:
/// 1. Explicit `prompt_file` (from `--prompt-file`)
/// 2. `SQLRAG_PROMPT_FILE` environment variable
/// 3. `~/.config/sqlrag-rs/system.md`
///
/// A missing, unreadable or blank file falls through to the default.
#[must_use]
pub fn load_system_prompt(prompt_file: Option<&Path>) -> String {
    let resolved = prompt_file
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(PROMPT_FILE_ENV).map(PathBuf::from))
        .or_else(default_prompt_path);

    resolved
        .and_then(|path| match std::fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(path = %path.display(), "loaded system prompt");
                Some(text)
            }
            _ => None,
        })
        .unwrap_or_else(|| SYSTEM_PROMPT.to_string())
}

/// Path of the default prompt file.
///
/// Returns `None` if the home directory cannot be determined.
#[must_use]
pub fn default_prompt_path() -> Option<PathBuf> {
    default_prompt_dir().map(|dir| dir.join(PROMPT_FILENAME))
}

/// Default prompt directory under the user's home.
#[must_use]
pub fn default_prompt_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_PROMPT_DIR))
}

/// Writes the compiled-in prompt to `dir` for editing.
///
/// Creates the directory if needed. An existing file is **not**
/// overwritten; returns `None` in that case.
///
/// # Errors
///
/// Returns an error if directory creation or writing fails.
pub fn write_default_prompt(dir: &Path) -> Result<Option<PathBuf>> {
    let path = dir.join(PROMPT_FILENAME);
    if path.exists() {
        return Ok(None);
    }
    write_file(&path, SYSTEM_PROMPT)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prompt_mentions_tools_and_rules() {
        assert!(SYSTEM_PROMPT.contains("query_vecdb"));
        assert!(SYSTEM_PROMPT.contains("run_sql_query"));
        assert!(SYSTEM_PROMPT.contains("request_clarification"));
        assert!(SYSTEM_PROMPT.contains("deleted_at IS NULL"));
        assert!(SYSTEM_PROMPT.contains("distinct name"));
    }

    #[test]
    fn test_explicit_file_wins() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.md");
        std::fs::write(&path, "custom prompt").unwrap();
        assert_eq!(load_system_prompt(Some(&path)), "custom prompt");
    }

    #[test]
    fn test_blank_file_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blank.md");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(load_system_prompt(Some(&path)), SYSTEM_PROMPT);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let prompt = load_system_prompt(Some(Path::new("/no/such/prompt.md")));
        assert_eq!(prompt, SYSTEM_PROMPT);
    }

    #[test]
    fn test_write_default_does_not_overwrite() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("prompts");

        let written = write_default_prompt(&dir).unwrap();
        assert_eq!(written, Some(dir.join(PROMPT_FILENAME)));

        std::fs::write(dir.join(PROMPT_FILENAME), "edited").unwrap();
        assert_eq!(write_default_prompt(&dir).unwrap(), None);
        assert_eq!(
            std::fs::read_to_string(dir.join(PROMPT_FILENAME)).unwrap(),
            "edited"
        );
    }
}
