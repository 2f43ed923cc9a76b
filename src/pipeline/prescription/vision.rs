//! Vision extraction adapter: sends a prescription image to an external
//! vision-capable chat model and returns its raw text answer.
//!
//! `PrescriptionReader` owns image encoding, the fixed instruction prompt and
//! response trimming. The transport sits behind `VisionClient`:
//! `OpenAiVisionClient` for OpenAI-compatible `/chat/completions` endpoints,
//! `MockVisionClient` for tests.
//!
//! One attempt per upload. Transport, auth, timeout and service errors all
//! surface as `PrescriptionError::ExtractionFailed`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::types::VisionClient;
use super::PrescriptionError;
use crate::config::ExtractionConfig;

// ──────────────────────────────────────────────
// Constants
// ──────────────────────────────────────────────

/// MIME type assumed when the upload does not declare one.
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

const PRESCRIPTION_PROMPT: &str = "\
You are a medical assistant OCR. Analyze the prescription image and extract medicines.
Return ONLY a raw JSON array (no markdown, no ```json wrapper).
Format: [{\"name\": \"Medicine Name\", \"dosage\": \"500mg\", \"frequency\": \"Twice Daily\", \"is_antibiotic\": boolean}]
Rules:
- Extract exact names.
- Guess antibiotic status based on name (set is_antibiotic: true/false).
- If text is illegible, return []";

// ──────────────────────────────────────────────
// PrescriptionReader
// ──────────────────────────────────────────────

/// Extraction client adapter: image bytes in, model text out.
pub struct PrescriptionReader {
    client: Arc<dyn VisionClient>,
    max_tokens: u32,
}

impl PrescriptionReader {
    pub fn new(client: Arc<dyn VisionClient>, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    /// Ask the vision model for the medicines on a prescription image.
    pub fn read(&self, image_bytes: &[u8], content_type: &str) -> Result<String, PrescriptionError> {
        let _span = tracing::info_span!(
            "prescription_vision_read",
            image_size = image_bytes.len(),
            content_type,
        )
        .entered();
        let start = std::time::Instant::now();

        let data_url = encode_data_url(image_bytes, content_type);
        let raw = self
            .client
            .chat_with_image(PRESCRIPTION_PROMPT, &data_url, self.max_tokens)
            .inspect_err(|e| tracing::error!(error = %e, "Vision extraction call failed"))?;

        let text = raw.trim().to_string();
        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            text_len = text.len(),
            "Vision extraction complete"
        );
        Ok(text)
    }
}

/// Encode raw image bytes as a base64 `data:` URL.
pub fn encode_data_url(image_bytes: &[u8], content_type: &str) -> String {
    let mime = match content_type.trim() {
        "" => DEFAULT_IMAGE_MIME,
        declared => declared,
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
    format!("data:{mime};base64,{encoded}")
}

// ──────────────────────────────────────────────
// OpenAiVisionClient
// ──────────────────────────────────────────────

/// HTTP client for OpenAI-compatible chat completion endpoints.
pub struct OpenAiVisionClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl OpenAiVisionClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, PrescriptionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PrescriptionError::ExtractionFailed(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout,
        })
    }

    /// Build a client from configuration. `None` when no credential is set.
    pub fn from_config(config: &ExtractionConfig) -> Result<Option<Self>, PrescriptionError> {
        match &config.api_key {
            None => Ok(None),
            Some(key) => Self::new(
                &config.base_url,
                key,
                &config.model,
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
        }
    }
}

/// Request body for `/chat/completions`
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

/// Response body from `/chat/completions`
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl VisionClient for OpenAiVisionClient {
    fn chat_with_image(
        &self,
        prompt: &str,
        image_data_url: &str,
        max_tokens: u32,
    ) -> Result<String, PrescriptionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_data_url },
                    },
                ],
            }],
            max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    PrescriptionError::ExtractionFailed(format!(
                        "Cannot reach extraction service at {}",
                        self.base_url
                    ))
                } else if e.is_timeout() {
                    PrescriptionError::ExtractionFailed(format!(
                        "Request timed out after {}ms",
                        self.timeout.as_millis()
                    ))
                } else {
                    PrescriptionError::ExtractionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PrescriptionError::ExtractionFailed(format!(
                "Service returned status {}: {body}",
                status.as_u16()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| PrescriptionError::ExtractionFailed(format!("Unreadable response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PrescriptionError::ExtractionFailed("Response contained no message content".into())
            })
    }
}

// ──────────────────────────────────────────────
// MockVisionClient (testing)
// ──────────────────────────────────────────────

/// Mock vision client: returns a configured response or failure and counts
/// calls.
pub struct MockVisionClient {
    response: Result<String, String>,
    calls: AtomicUsize,
}

impl MockVisionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VisionClient for MockVisionClient {
    fn chat_with_image(
        &self,
        _prompt: &str,
        _image_data_url: &str,
        _max_tokens: u32,
    ) -> Result<String, PrescriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .map_err(PrescriptionError::ExtractionFailed)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    #[test]
    fn data_url_uses_declared_mime() {
        let url = encode_data_url(b"\x89PNG", "image/png");
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn data_url_defaults_to_jpeg() {
        let url = encode_data_url(b"abc", "");
        assert_eq!(url, "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn prompt_requests_raw_json_array() {
        assert!(PRESCRIPTION_PROMPT.contains("raw JSON array"));
        assert!(PRESCRIPTION_PROMPT.contains("is_antibiotic"));
        assert!(PRESCRIPTION_PROMPT.contains("return []"));
    }

    #[test]
    fn reader_trims_response() {
        let mock = Arc::new(MockVisionClient::new("\n  [] \n"));
        let reader = PrescriptionReader::new(mock.clone(), 1000);
        assert_eq!(reader.read(b"img", "image/png").unwrap(), "[]");
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn reader_propagates_failure_without_retry() {
        let mock = Arc::new(MockVisionClient::failing("401 unauthorized"));
        let reader = PrescriptionReader::new(mock.clone(), 1000);
        let err = reader.read(b"img", "image/png").unwrap_err();
        assert!(matches!(err, PrescriptionError::ExtractionFailed(_)));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn from_config_without_key_is_none() {
        let config = ExtractionConfig::default();
        assert!(OpenAiVisionClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = OpenAiVisionClient::new(
            "http://localhost:8080/v1/",
            "sk-test",
            "gpt-4o-mini",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }

    // ── HTTP behaviour against a local stub service ──

    #[derive(Clone, Default)]
    struct Captured {
        body: Arc<Mutex<Option<serde_json::Value>>>,
        auth: Arc<Mutex<Option<String>>>,
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn client_for(base_url: &str, timeout: Duration) -> OpenAiVisionClient {
        OpenAiVisionClient::new(base_url, "sk-test", "gpt-4o-mini", timeout).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sends_single_turn_with_image_and_bearer() {
        let captured = Captured::default();
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    |State(c): State<Captured>, headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                        *c.auth.lock().unwrap() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        *c.body.lock().unwrap() = Some(body);
                        Json(serde_json::json!({
                            "choices": [{"message": {"role": "assistant", "content": "[]"}}]
                        }))
                    },
                ),
            )
            .with_state(captured.clone());
        let base = spawn_stub(router).await;

        let text = tokio::task::spawn_blocking(move || {
            client_for(&base, Duration::from_secs(5)).chat_with_image(
                "extract",
                "data:image/png;base64,AAAA",
                1000,
            )
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(text, "[]");

        assert_eq!(captured.auth.lock().unwrap().as_deref(), Some("Bearer sk-test"));
        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 1000);
        let content = &body["messages"][0]["content"];
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "extract");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AAAA");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn service_error_status_is_extraction_failure() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let base = spawn_stub(router).await;

        let err = tokio::task::spawn_blocking(move || {
            client_for(&base, Duration::from_secs(5)).chat_with_image("p", "data:", 10)
        })
        .await
        .unwrap()
        .unwrap_err();
        match err {
            PrescriptionError::ExtractionFailed(msg) => assert!(msg.contains("401")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_choices_is_extraction_failure() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(serde_json::json!({ "choices": [] })) }),
        );
        let base = spawn_stub(router).await;

        let err = tokio::task::spawn_blocking(move || {
            client_for(&base, Duration::from_secs(5)).chat_with_image("p", "data:", 10)
        })
        .await
        .unwrap()
        .unwrap_err();
        assert!(matches!(err, PrescriptionError::ExtractionFailed(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn slow_service_times_out() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(serde_json::json!({ "choices": [] }))
            }),
        );
        let base = spawn_stub(router).await;

        let err = tokio::task::spawn_blocking(move || {
            client_for(&base, Duration::from_millis(200)).chat_with_image("p", "data:", 10)
        })
        .await
        .unwrap()
        .unwrap_err();
        match err {
            PrescriptionError::ExtractionFailed(msg) => assert!(msg.contains("timed out")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreachable_service_is_extraction_failure() {
        // Port 9 (discard) on loopback is not expected to accept HTTP.
        let client = client_for("http://127.0.0.1:9/v1", Duration::from_secs(2));
        let err = client.chat_with_image("p", "data:", 10).unwrap_err();
        assert!(matches!(err, PrescriptionError::ExtractionFailed(_)));
    }
}
