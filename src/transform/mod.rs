//! # Rule Transformation
//!
//! Rewrites a cleaned table according to a JSON rule document. The primary
//! path sends table and rules to a chat-completion service and parses the
//! CSV it returns; when the service is unconfigured, unreachable or answers
//! something that is not a table, a deterministic fallback takes over. The
//! transform as a whole never fails.

pub mod debug;
pub mod fallback;
pub mod llm;
pub mod rules;

pub use debug::DebugSink;
pub use fallback::apply_fallback;
pub use llm::ChatCompleter;
pub use llm::LlmConfig;
pub use llm::OpenAiChat;
pub use rules::RuleSet;

use crate::table::Table;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the completion service. These stay
/// internal to the transform: callers of [`RuleTransformer::transform`] only
/// ever see a table.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{0}")]
    HttpError(#[from] reqwest::Error),

    #[error("service returned status {status}: {message}")]
    ServiceStatus { status: u16, message: String },

    #[error("malformed service response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    TableError(#[from] crate::table::TableError),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
}

const MAX_RETRIES: u32 = 2;

/// Applies a rule document to a table, service first, fallback second.
pub struct RuleTransformer {
    client: Option<Box<dyn ChatCompleter>>,
    sink: DebugSink,
}

impl RuleTransformer {
    pub fn new(client: Option<Box<dyn ChatCompleter>>, sink: DebugSink) -> RuleTransformer {
        RuleTransformer { client, sink }
    }

    /// Builds a transformer from the process environment: remote when an
    /// API key is configured, fallback-only otherwise.
    pub fn from_env(sink: DebugSink) -> RuleTransformer {
        let client = LlmConfig::from_env()
            .and_then(|config| match OpenAiChat::new(config) {
                Ok(chat) => Some(Box::new(chat) as Box<dyn ChatCompleter>),
                Err(error) => {
                    tracing::warn!(%error, "cannot build completion client");
                    None
                }
            });
        RuleTransformer::new(client, sink)
    }

    /// Transforms `table` according to `rules`. Total: any remote failure
    /// degrades to the deterministic fallback.
    pub fn transform(&self, table: &Table, rules: &RuleSet) -> Table {
        if let Some(client) = &self.client {
            match self.transform_remote(client.as_ref(), table, rules) {
                Ok(transformed) => return transformed,
                Err(error) => {
                    tracing::warn!(%error, "remote transform failed, using fallback");
                }
            }
        }
        apply_fallback(table, rules)
    }

    fn transform_remote(
        &self,
        client: &dyn ChatCompleter,
        table: &Table,
        rules: &RuleSet,
    ) -> Result<Table, TransformError> {
        let csv = table.to_csv()?;
        let rules_json = serde_json::to_string(rules.document())?;
        let prompt = llm::build_user_prompt(&rules_json, &csv);

        let raw = self.request_with_retries(client, &prompt)?;
        let cleaned = sanitize_response(&raw);
        match Table::from_csv(&cleaned) {
            Ok(table) => Ok(table),
            Err(error) => {
                self.sink.record(&raw);
                Err(error.into())
            }
        }
    }

    fn request_with_retries(
        &self,
        client: &dyn ChatCompleter,
        prompt: &str,
    ) -> Result<String, TransformError> {
        let mut attempt = 0;
        loop {
            match client.complete(llm::SYSTEM_PROMPT, prompt) {
                Ok(response) => return Ok(response),
                Err(error) if attempt < MAX_RETRIES => {
                    attempt += 1;
                    tracing::warn!(%error, attempt, "completion request failed, retrying");
                    thread::sleep(Duration::from_millis(1_000 + 500 * u64::from(attempt)));
                }
                Err(error) => {
                    self.sink
                        .record(&format!("{}\n\n--ERROR:\n{}", prompt, error));
                    return Err(error);
                }
            }
        }
    }
}

/// Strips the decorations models wrap around CSV: code fences and leading
/// prose before the first line that looks like a CSV record.
fn sanitize_response(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();
    match lines.iter().position(|line| line.contains(',')) {
        Some(first) => lines[first..].join("\n"),
        None => raw.trim().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::cell::CellValue;
    use std::fs;

    struct Scripted {
        responses: Vec<Result<String, &'static str>>,
        calls: std::cell::RefCell<usize>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<String, &'static str>>) -> Scripted {
            Scripted {
                responses,
                calls: std::cell::RefCell::new(0),
            }
        }
    }

    impl ChatCompleter for Scripted {
        fn complete(&self, _system: &str, _user: &str) -> Result<String, TransformError> {
            let mut calls = self.calls.borrow_mut();
            let index = (*calls).min(self.responses.len() - 1);
            *calls += 1;
            match &self.responses[index] {
                Ok(text) => Ok(text.to_owned()),
                Err(message) => Err(TransformError::MalformedResponse(message.to_string())),
            }
        }
    }

    fn sample_table() -> Table {
        Table::new(
            vec!["unidad".to_string(), "serie".to_string()],
            vec![vec![CellValue::text("AUTO"), CellValue::text("s1")]],
        )
    }

    #[test]
    fn fenced_csv_responses_are_parsed() {
        let client = Scripted::new(vec![Ok(
            "Here is your table:\n```csv\na,b\n1,2\n```\n".to_string()
        )]);
        let transformer = RuleTransformer::new(Some(Box::new(client)), DebugSink::disabled());
        let result = transformer.transform(&sample_table(), &RuleSet::empty());
        assert_eq!(result.columns(), ["a", "b"]);
        assert_eq!(result.rows()[0][0], CellValue::Number(1.0));
    }

    #[test]
    fn garbage_responses_fall_back_and_leave_an_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let client = Scripted::new(vec![Ok("I cannot process this table.".to_string())]);
        let transformer =
            RuleTransformer::new(Some(Box::new(client)), DebugSink::new(dir.path()));
        let result = transformer.transform(&sample_table(), &RuleSet::empty());
        // Fallback output: original columns plus the four appended ones.
        assert_eq!(result.column_count(), 6);
        let artifacts: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(artifacts.len(), 1);
    }

    #[test]
    fn errors_retry_before_falling_back() {
        let client = Scripted::new(vec![Err("boom"), Ok("a,b\nx,1\n".to_string())]);
        let transformer = RuleTransformer::new(Some(Box::new(client)), DebugSink::disabled());
        let result = transformer.transform(&sample_table(), &RuleSet::empty());
        assert_eq!(result.columns(), ["a", "b"]);
    }

    #[test]
    fn no_client_means_fallback_only() {
        let transformer = RuleTransformer::new(None, DebugSink::disabled());
        let result = transformer.transform(&sample_table(), &RuleSet::empty());
        assert_eq!(result.column_count(), 6);
        assert_eq!(result.row_count(), 1);
    }

    #[test]
    fn sanitize_keeps_plain_csv_untouched() {
        assert_eq!(sanitize_response("a,b\n1,2\n"), "a,b\n1,2");
        assert_eq!(sanitize_response("  no table here  "), "no table here");
    }
}
