//! Transport for the Anthropic Messages API.
//!
//! Every LLM call in the service goes through `LlmClient`. Prompts live with
//! their callers (see `generation::prompts`); this module only sends one user
//! message, retries transient failures and pulls JSON out of the reply.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("reply is not the expected JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no successful reply after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("reply has no text content")]
    NoText,
}

/// How many times a request is sent and how long to wait in between.
/// The wait doubles after every failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Wait before the given attempt (0-based). The first attempt goes out
    /// immediately.
    fn delay_before(&self, attempt: u32) -> Option<Duration> {
        match attempt {
            0 => None,
            n => Some(self.base_delay * 2u32.saturating_pow(n - 1)),
        }
    }
}

/// What a response status means for the retry loop.
#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    Accept,
    Retry,
    Reject,
}

fn verdict(status: StatusCode) -> Verdict {
    if status.is_success() {
        Verdict::Accept
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Verdict::Retry
    } else {
        Verdict::Reject
    }
}

/// One failed attempt, tagged with whether another attempt may help.
enum Failure {
    Transient(LlmError),
    Fatal(LlmError),
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Turn<'a>; 1],
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct Reply {
    content: Vec<Block>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl Reply {
    /// All text blocks, joined in order.
    fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|block| match block {
                Block::Text { text } => Some(text.as_str()),
                Block::Other => None,
            })
            .collect();
        (!parts.is_empty()).then(|| parts.concat())
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Prefers the API's own error message over the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body)
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(api_key: String, request_timeout: Duration) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            api_key,
            retry: RetryPolicy::default(),
        })
    }

    /// Sends `prompt` as a single user turn and decodes the reply text as
    /// JSON, tolerating a surrounding code fence.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let reply = self.complete(prompt, system).await?;
        let text = reply.text().ok_or(LlmError::NoText)?;
        Ok(serde_json::from_str(strip_json_fences(&text))?)
    }

    async fn complete(&self, prompt: &str, system: &str) -> Result<Reply, LlmError> {
        let request = Request {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: [Turn {
                role: "user",
                content: prompt,
            }],
        };

        let mut last = None;
        for attempt in 0..self.retry.attempts {
            if let Some(delay) = self.retry.delay_before(attempt) {
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying LLM request");
                tokio::time::sleep(delay).await;
            }

            match self.send_once(&request).await {
                Ok(reply) => return Ok(reply),
                Err(Failure::Fatal(e)) => return Err(e),
                Err(Failure::Transient(e)) => {
                    warn!(attempt, "LLM request failed: {e}");
                    last = Some(e);
                }
            }
        }

        Err(last.unwrap_or(LlmError::RetriesExhausted {
            attempts: self.retry.attempts,
        }))
    }

    async fn send_once(&self, request: &Request<'_>) -> Result<Reply, Failure> {
        let response = self
            .http
            .post(ENDPOINT)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| Failure::Transient(e.into()))?;

        let status = response.status();
        match verdict(status) {
            Verdict::Accept => {
                let reply: Reply = response.json().await.map_err(|e| Failure::Fatal(e.into()))?;
                if let Some(usage) = &reply.usage {
                    debug!(
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        "LLM call succeeded"
                    );
                }
                Ok(reply)
            }
            verdict => {
                let body = response.text().await.unwrap_or_default();
                let error = LlmError::Status {
                    status: status.as_u16(),
                    message: error_message(body),
                };
                Err(if verdict == Verdict::Retry {
                    Failure::Transient(error)
                } else {
                    Failure::Fatal(error)
                })
            }
        }
    }
}

/// Removes a surrounding ```json / ``` fence if the model added one.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let inner = inner.trim_start();
    inner.strip_suffix("```").map(str::trim).unwrap_or(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences() {
        let cases = [
            ("```json\n{\"bullets\": []}\n```", "{\"bullets\": []}"),
            ("```\n{\"bullets\": []}\n```", "{\"bullets\": []}"),
            ("  {\"a\": 1}\n", "{\"a\": 1}"),
            ("```json\n{\"a\": 1}", "{\"a\": 1}"),
        ];
        for (input, expected) in cases {
            assert_eq!(strip_json_fences(input), expected, "{input:?}");
        }
    }

    #[test]
    fn test_retry_delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(0), None);
        assert_eq!(policy.delay_before(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_before(2), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_verdict_by_status() {
        assert_eq!(verdict(StatusCode::OK), Verdict::Accept);
        assert_eq!(verdict(StatusCode::TOO_MANY_REQUESTS), Verdict::Retry);
        assert_eq!(verdict(StatusCode::BAD_GATEWAY), Verdict::Retry);
        assert_eq!(verdict(StatusCode::UNAUTHORIZED), Verdict::Reject);
        assert_eq!(verdict(StatusCode::BAD_REQUEST), Verdict::Reject);
    }

    #[test]
    fn test_reply_text_joins_text_blocks() {
        let reply: Reply = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"a\":"},{"type":"tool_use","id":"t"},
                {"type":"text","text":"1}"}]}"#,
        )
        .unwrap();
        assert_eq!(reply.text().as_deref(), Some("{\"a\":1}"));
        assert!(reply.usage.is_none());

        let empty: Reply = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"bad key"}}"#;
        assert_eq!(error_message(body.to_string()), "bad key");
        assert_eq!(error_message("upstream down".to_string()), "upstream down");
    }
}
