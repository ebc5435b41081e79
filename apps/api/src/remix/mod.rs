/// Remix client — the single point of entry for all LLM provider calls.
///
/// ARCHITECTURAL RULE: No other module may call the chat-completions API
/// directly. All LLM interactions MUST go through this module.
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// The model used for all remix calls.
pub const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.8;

/// Fatal precondition failures. Per-item request errors never surface here —
/// they become tagged `RemixOutcome::Err` entries instead.
#[derive(Debug, Error)]
pub enum RemixError {
    #[error("LLM API key is not configured")]
    MissingApiKey,
}

/// Failure category for a single style request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemixErrorKind {
    /// Transport-level failure (connection, timeout).
    Http,
    /// Non-success status from the provider.
    Api,
    /// Provider answered but the completion body was empty or blank.
    Empty,
    /// Response body did not match the expected shape.
    Parse,
}

/// Provider-reported details attached to a successful variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantMetadata {
    pub model: String,
    pub total_tokens: Option<u32>,
    pub original_length: usize,
}

/// Tagged per-style result. Every requested style produces exactly one of
/// these, success or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemixOutcome {
    Ok {
        content: String,
        metadata: VariantMetadata,
    },
    Err {
        kind: RemixErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantResult {
    pub style: String,
    pub outcome: RemixOutcome,
}

// Chat-completions wire types.

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<UsageBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageBody,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageBody {
    total_tokens: u32,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
/// No retry logic lives here: a failed style stays a visible error card until
/// the user re-triggers the whole batch.
#[derive(Clone)]
pub struct RemixClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemixClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            api_key,
        }
    }

    /// Generates one variant per style tag, all requests in flight at once.
    ///
    /// The returned vector always has one entry per input style, in input
    /// order regardless of completion order. Individual failures become
    /// tagged error outcomes instead of aborting the batch; only a missing
    /// API key fails the call as a whole, before any request is issued.
    pub async fn generate_variants(
        &self,
        content: &str,
        styles: &[String],
    ) -> Result<Vec<VariantResult>, RemixError> {
        let api_key = self.api_key.as_deref().ok_or(RemixError::MissingApiKey)?;

        let requests = styles
            .iter()
            .map(|style| self.remix_one(api_key, content, style));

        // join_all preserves input ordering in the combined output.
        Ok(join_all(requests).await)
    }

    async fn remix_one(&self, api_key: &str, content: &str, style: &str) -> VariantResult {
        let outcome = match self.request_completion(api_key, content, style).await {
            Ok((text, metadata)) => RemixOutcome::Ok {
                content: text,
                metadata,
            },
            Err((kind, message)) => {
                warn!("Remix request for style '{style}' failed: {message}");
                RemixOutcome::Err { kind, message }
            }
        };

        VariantResult {
            style: style.to_string(),
            outcome,
        }
    }

    async fn request_completion(
        &self,
        api_key: &str,
        content: &str,
        style: &str,
    ) -> Result<(String, VariantMetadata), (RemixErrorKind, String)> {
        let prompt = prompts::build_prompt(content, style);
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| (RemixErrorKind::Http, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err((
                RemixErrorKind::Api,
                format!("provider returned {status}: {body}"),
            ));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| (RemixErrorKind::Parse, format!("unparseable response: {e}")))?;

        let text = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                (
                    RemixErrorKind::Empty,
                    "no content received from provider".to_string(),
                )
            })?
            .to_string();

        debug!(
            "Remix for style '{style}' succeeded: total_tokens={}",
            completion
                .usage
                .as_ref()
                .map(|u| u.total_tokens)
                .unwrap_or(0)
        );

        Ok((
            text,
            VariantMetadata {
                model: completion.model.unwrap_or_else(|| MODEL.to_string()),
                total_tokens: completion.usage.map(|u| u.total_tokens),
                original_length: content.len(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_parses_provider_shape() {
        let json = r#"{
            "choices": [{"message": {"content": "A post.\n#growth"}}],
            "model": "gpt-4o-mini",
            "usage": {"total_tokens": 123}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("A post.\n#growth")
        );
        assert_eq!(parsed.usage.unwrap().total_tokens, 123);
    }

    #[test]
    fn test_chat_response_tolerates_missing_optionals() {
        let json = r#"{"choices": [{"message": {}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
        assert!(parsed.model.is_none());
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = RemixOutcome::Err {
            kind: RemixErrorKind::Api,
            message: "provider returned 500".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "err");
        assert_eq!(value["kind"], "api");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_fatal_before_any_request() {
        let client = RemixClient::new("http://127.0.0.1:9".to_string(), None);
        let result = client
            .generate_variants("some text", &["tips".to_string()])
            .await;
        assert!(matches!(result, Err(RemixError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_yields_error_results_in_order() {
        // Port 9 (discard) refuses connections; every item fails as Http but
        // the batch still returns one result per style, in input order.
        let client = RemixClient::new(
            "http://127.0.0.1:9".to_string(),
            Some("test-key".to_string()),
        );
        let styles = vec!["storytelling".to_string(), "tips".to_string()];
        let results = client
            .generate_variants("Our Q3 revenue grew 40%.", &styles)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].style, "storytelling");
        assert_eq!(results[1].style, "tips");
        for result in &results {
            assert!(matches!(
                result.outcome,
                RemixOutcome::Err {
                    kind: RemixErrorKind::Http,
                    ..
                }
            ));
        }
    }
}
