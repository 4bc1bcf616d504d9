use crate::transform::TransformError;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const SYSTEM_PROMPT: &str = "You are a data transformation engine. \
You receive a table as CSV together with a JSON rule document and you return \
the transformed table as CSV. Respond with the CSV text only: no prose, no \
explanations, no code fences.";

/// Connection settings for an OpenAI-compatible chat-completion endpoint.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> LlmConfig {
        LlmConfig {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// `OPENAI_API_KEY` is required; `OPENAI_API_BASE` and `GRIDPRESS_MODEL`
    /// override the endpoint and model. Returns `None` without a key, in
    /// which case the caller runs fallback-only.
    pub fn from_env() -> Option<LlmConfig> {
        let api_key = env::var("OPENAI_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }
        let mut config = LlmConfig::new(api_key);
        if let Ok(base) = env::var("OPENAI_API_BASE") {
            config.endpoint = format!("{}/chat/completions", base.trim_end_matches('/'));
        }
        if let Ok(model) = env::var("GRIDPRESS_MODEL") {
            config.model = model;
        }
        Some(config)
    }
}

/// A blocking chat-completion call: system and user message in, the
/// assistant's text out. The one seam the transformer needs, so tests can
/// substitute a scripted implementation.
pub trait ChatCompleter {
    fn complete(&self, system: &str, user: &str) -> Result<String, TransformError>;
}

/// [`ChatCompleter`] backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAiChat {
    config: LlmConfig,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiChat {
    pub fn new(config: LlmConfig) -> Result<OpenAiChat, TransformError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(OpenAiChat { config, client })
    }
}

impl ChatCompleter for OpenAiChat {
    fn complete(&self, system: &str, user: &str) -> Result<String, TransformError> {
        let body = json!({
            "model": self.config.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransformError::ServiceStatus {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            });
        }

        let text = response.text()?;
        let payload: ChatResponse = serde_json::from_str(&text)
            .map_err(|_| TransformError::MalformedResponse(text.to_owned()))?;
        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(TransformError::MalformedResponse(text))
    }
}

/// Builds the user message: the rule document, the table, and the output
/// contract the response parser depends on.
pub(crate) fn build_user_prompt(rules_json: &str, csv: &str) -> String {
    format!(
        "Apply the following transformation rules to the table below.\n\
         \n\
         Rules (JSON):\n{rules_json}\n\
         \n\
         Table (CSV, first row is the header):\n{csv}\n\
         Output requirements:\n\
         - Return ONLY the transformed table as CSV, nothing else.\n\
         - Keep the first row as the header row.\n\
         - Every row must have the same number of fields as the header.\n\
         - Quote any field that contains a comma, or replace internal \
         thousand-separator commas with dots.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = LlmConfig::new("key");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn user_prompt_carries_rules_and_table() {
        let prompt = build_user_prompt("{\"a\":1}", "h1,h2\nx,1\n");
        assert!(prompt.contains("{\"a\":1}"));
        assert!(prompt.contains("h1,h2\nx,1\n"));
        assert!(prompt.contains("ONLY the transformed table as CSV"));
    }
}
