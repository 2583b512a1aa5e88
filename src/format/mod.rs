//! Rendering query results for the user.
//!
//! The shape of the result picks the rendering:
//!
//! - no rows: a fixed message
//! - one row with one column: a sentence written by the model
//! - anything else: a Markdown table

use crate::core::ResultSet;
use crate::error::Result;
use crate::llm::LlmClient;
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;

/// Answer for an empty result.
pub const NO_RECORDS_MESSAGE: &str = "I found no records matching your query.";

/// How a result set will be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// No rows.
    Empty,
    /// Exactly one row with exactly one column, and nothing cut off.
    Scalar,
    /// Everything else.
    Table,
}

/// Classifies a result set by shape.
///
/// A truncated single cell is a table: more rows matched than were fetched.
#[must_use]
pub fn classify(result: &ResultSet) -> ResultShape {
    if result.is_empty() {
        ResultShape::Empty
    } else if result.scalar().is_some() && !result.truncated {
        ResultShape::Scalar
    } else {
        ResultShape::Table
    }
}

/// Plain-text rendering of one cell.
///
/// Strings are written raw, null as `NULL`, nested values as compact JSON.
#[must_use]
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}

/// Renders rows as a Markdown table.
///
/// Columns come from the first row; cells are not escaped or aligned.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sqlrag_rs::core::ResultSet;
/// use sqlrag_rs::format::render_markdown_table;
///
/// let rs = ResultSet::from_json(json!([{"id": 1, "name": "Asha"}])).unwrap();
/// assert_eq!(
///     render_markdown_table(&rs),
///     "| id | name |\n| --- | --- |\n| 1 | Asha |"
/// );
/// ```
#[must_use]
pub fn render_markdown_table(result: &ResultSet) -> String {
    let columns = result.columns();
    let mut lines = Vec::with_capacity(result.len() + 2);
    lines.push(format!("| {} |", columns.join(" | ")));
    lines.push(format!("| {} |", vec!["---"; columns.len()].join(" | ")));

    for row in &result.rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| row.get(*column).map(render_cell).unwrap_or_default())
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    let mut table = lines.join("\n");
    if result.truncated {
        let _ = write!(table, "\n\n_Showing the first {} rows._", result.len());
    }
    table
}

/// Builds the prompt that turns a single value into a sentence.
#[must_use]
pub fn build_sentence_prompt(question: &str, value: &Value) -> String {
    format!(
        "The user asked: '{question}'\n\
         The SQL query returned this value: {value}\n\n\
         Write one concise, natural-language sentence that answers the user's question using this value.\n\
         If the value is a monetary amount, format it as 'Rs. <amount>'.\n\
         Example: if the user asked 'How many customers are there?' and the value is 100, \
         answer 'There are 100 customers.'",
        value = render_cell(value),
    )
}

/// Turns result sets into user-facing answers.
pub struct ResultFormatter {
    llm: Arc<dyn LlmClient>,
}

impl std::fmt::Debug for ResultFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultFormatter")
            .field("llm", &self.llm.name())
            .finish()
    }
}

impl ResultFormatter {
    /// Creates a formatter that uses `llm` for single-value sentences.
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Renders `result` as the answer to `question`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the sentence call to the model fails.
    pub async fn format(&self, question: &str, result: &ResultSet) -> Result<String> {
        match (classify(result), result.scalar()) {
            (ResultShape::Scalar, Some(value)) => {
                let prompt = build_sentence_prompt(question, value);
                let sentence = self.llm.prompt(&prompt).await?;
                Ok(sentence.trim().to_string())
            }
            (ResultShape::Empty, _) => Ok(NO_RECORDS_MESSAGE.to_string()),
            _ => Ok(render_markdown_table(result)),
        }
    }
}
