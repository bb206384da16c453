//! AI adapter: the outbound call to the analysis provider.
//!
//! A client takes a rendered prompt and returns the model's raw text, untouched.
//! It never parses the assessment itself and never retries.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AiConfig;
use crate::error::ClientError;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Fallback when a failed response carries no readable error message.
pub const GENERIC_SERVICE_ERROR: &str = "API error";

const USER_AGENT: &str = "news-bias-detector/0.1";

pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ClientError>> + Send + 'a>>;

/// Trait object used by the controller (and by test doubles).
pub trait AnalysisClient: Send + Sync {
    /// Send one prompt; returns the generated text.
    fn send<'a>(&'a self, prompt: &'a str) -> SendFuture<'a>;
    /// Provider name for diagnostics/logs.
    fn provider_name(&self) -> &'static str;
}

pub type DynAnalysisClient = Arc<dyn AnalysisClient>;

/// Factory: build a client according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns the deterministic mock client.
/// * Else builds the provider named in `config.provider`.
pub fn build_client_from_config(config: &AiConfig) -> anyhow::Result<DynAnalysisClient> {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Ok(Arc::new(MockClient::default()));
    }

    let http = http_client(config)?;
    let client: DynAnalysisClient = match config.provider.as_str() {
        "gemini" => Arc::new(GeminiClient {
            http,
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string()),
            base_url: trim_base(config.base_url.as_deref().unwrap_or(GEMINI_BASE_URL)),
        }),
        "openai" => Arc::new(OpenAiClient {
            http,
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            base_url: trim_base(config.base_url.as_deref().unwrap_or(OPENAI_BASE_URL)),
        }),
        "mock" => Arc::new(MockClient::default()),
        other => bail!("Unsupported provider: {other}"),
    };
    Ok(client)
}

fn http_client(config: &AiConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("building reqwest client")
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

// ------------------------------------------------------------
// Shared HTTP plumbing
// ------------------------------------------------------------

/// Send a prepared request and decode the JSON body.
/// Non-2xx → `Service` (message from `error.message`), anything unreadable → `Transport`.
async fn exchange(req: reqwest::RequestBuilder) -> Result<Value, ClientError> {
    // `without_url` keeps endpoint details (and any key in them) out of messages.
    let resp = req
        .send()
        .await
        .map_err(|e| ClientError::Transport(e.without_url().to_string()))?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ClientError::Transport(e.without_url().to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| GENERIC_SERVICE_ERROR.to_string());
        return Err(ClientError::Service(message));
    }

    serde_json::from_str(&body)
        .map_err(|e| ClientError::Transport(format!("undecodable response body: {e}")))
}

/// `{"error": {"message": "..."}}`, the shape used by both Gemini and OpenAI.
pub fn error_message(payload: &Value) -> Option<String> {
    payload
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn require_key(key: &str) -> Result<(), ClientError> {
    if key.is_empty() {
        return Err(ClientError::Transport("missing API key".to_string()));
    }
    Ok(())
}

// ------------------------------------------------------------
// Gemini (generateContent)
// ------------------------------------------------------------

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}
#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}
#[derive(Serialize)]
struct GeminiReq<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Deserialize)]
struct GeminiResp {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<GeminiFeedback>,
}
#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiRespContent>,
}
#[derive(Deserialize)]
struct GeminiRespContent {
    #[serde(default)]
    parts: Vec<GeminiRespPart>,
}
#[derive(Deserialize)]
struct GeminiRespPart {
    text: Option<String>,
}
#[derive(Deserialize)]
struct GeminiFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Pull the generated text out of a decoded generateContent body.
pub fn gemini_text(body: Value) -> Result<String, ClientError> {
    let resp: GeminiResp = serde_json::from_value(body)
        .map_err(|e| ClientError::Transport(format!("unexpected generateContent shape: {e}")))?;

    if resp.candidates.is_empty() {
        if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ClientError::Service(format!("prompt blocked: {reason}")));
        }
    }

    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(ClientError::Transport(
            "generateContent response carried no text".to_string(),
        ));
    }
    Ok(text)
}

impl AnalysisClient for GeminiClient {
    fn send<'a>(&'a self, prompt: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            require_key(&self.api_key)?;
            let url = format!(
                "{}/v1/models/{}:generateContent",
                self.base_url, self.model
            );
            let req = GeminiReq {
                contents: vec![GeminiContent {
                    parts: vec![GeminiPart { text: prompt }],
                }],
            };
            let body = exchange(
                self.http
                    .post(url)
                    .header("x-goog-api-key", &self.api_key)
                    .json(&req),
            )
            .await?;
            gemini_text(body)
        })
    }
    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// OpenAI-compatible (Chat Completions)
// ------------------------------------------------------------

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}
#[derive(Serialize)]
struct ChatReq<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
}
#[derive(Deserialize)]
struct ChatResp {
    choices: Vec<Choice>,
}
#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}
#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

pub fn openai_text(body: Value) -> Result<String, ClientError> {
    let resp: ChatResp = serde_json::from_value(body)
        .map_err(|e| ClientError::Transport(format!("unexpected chat completion shape: {e}")))?;
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientError::Transport("chat completion carried no text".to_string()))
}

impl AnalysisClient for OpenAiClient {
    fn send<'a>(&'a self, prompt: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            require_key(&self.api_key)?;
            let req = ChatReq {
                model: &self.model,
                messages: vec![Msg {
                    role: "user",
                    content: prompt,
                }],
                temperature: 0.2,
            };
            let body = exchange(
                self.http
                    .post(format!("{}/v1/chat/completions", self.base_url))
                    .bearer_auth(&self.api_key)
                    .json(&req),
            )
            .await?;
            openai_text(body)
        })
    }
    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// ------------------------------------------------------------
// Mock
// ------------------------------------------------------------

/// Canned response used when `AI_TEST_MODE=mock` or `provider = "mock"`.
pub const MOCK_RESPONSE: &str = "```json\n{\"politicalLeaning\":\"Center\",\"biasScore\":10,\"tone\":\"Neutral\",\"framingTechniques\":[],\"chargedWords\":[],\"summary\":\"Neutral reporting (mock).\",\"recommendation\":\"Compare with other sources.\"}\n```";

/// Deterministic client returning a fixed reply; counts calls.
pub struct MockClient {
    reply: Result<String, ClientError>,
    calls: AtomicUsize,
}

impl MockClient {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: ClientError) -> Self {
        Self {
            reply: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::replying(MOCK_RESPONSE)
    }
}

impl AnalysisClient for MockClient {
    fn send<'a>(&'a self, _prompt: &'a str) -> SendFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = self.reply.clone();
        Box::pin(async move { out })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gemini_text_joins_parts_of_first_candidate() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        assert_eq!(gemini_text(body).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn gemini_blocked_prompt_is_a_service_error() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert_eq!(
            gemini_text(body),
            Err(ClientError::Service("prompt blocked: SAFETY".into()))
        );
    }

    #[test]
    fn gemini_without_text_is_transport() {
        assert!(matches!(
            gemini_text(json!({"candidates": []})),
            Err(ClientError::Transport(_))
        ));
        assert!(matches!(
            gemini_text(json!({"candidates": "nope"})),
            Err(ClientError::Transport(_))
        ));
    }

    #[test]
    fn openai_text_reads_first_choice() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(openai_text(body).unwrap(), "hi");
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            error_message(&json!({"error": {"code": 429, "message": "quota exceeded"}})),
            Some("quota exceeded".into())
        );
        assert_eq!(error_message(&json!({"error": {"message": "  "}})), None);
        assert_eq!(error_message(&json!({"detail": "x"})), None);
    }

    #[tokio::test]
    async fn mock_counts_calls() {
        let m = MockClient::default();
        assert!(m.send("p").await.is_ok());
        assert!(m.send("p").await.is_ok());
        assert_eq!(m.calls(), 2);
    }
}
