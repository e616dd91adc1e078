use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("translation service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("malformed translation response: {0}")]
    Malformed(String),
}

/// Narrow seam over the machine-translation backend. One attempt per call;
/// the surrounding repair policy is the resilience mechanism, not retries.
pub trait TranslationService: Send + Sync {
    /// Liveness probe. Never fails; any transport or protocol error is `false`.
    fn is_available(&self) -> ServiceFuture<bool>;

    /// Best-ranked language code for `text`. Fails soft: on any error this
    /// returns the configured fallback language.
    fn detect_language(&self, text: String) -> ServiceFuture<String>;

    fn translate(
        &self,
        text: String,
        from: String,
        to: String,
    ) -> ServiceFuture<Result<String, GatewayError>>;
}

/// Explicit gateway configuration, passed in by the caller instead of being
/// read from process-wide state.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub fallback_language: String,
}

/// Client for a LibreTranslate-compatible HTTP service.
#[derive(Debug, Clone)]
pub struct LibreTranslate {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl LibreTranslate {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

impl TranslationService for LibreTranslate {
    fn is_available(&self) -> ServiceFuture<bool> {
        let client = self.client.clone();
        let url = self.endpoint("health");
        Box::pin(async move {
            match client.get(&url).timeout(PROBE_TIMEOUT).send().await {
                Ok(response) => response.status().is_success(),
                Err(_) => false,
            }
        })
    }

    fn detect_language(&self, text: String) -> ServiceFuture<String> {
        let client = self.client.clone();
        let url = self.endpoint("detect");
        let api_key = self.config.api_key.clone();
        let fallback = self.config.fallback_language.clone();
        Box::pin(async move {
            match detect_request(&client, &url, api_key.as_deref(), &text).await {
                Ok(language) => language,
                Err(err) => {
                    warn!("language detection failed, assuming '{}': {}", fallback, err);
                    fallback
                }
            }
        })
    }

    fn translate(
        &self,
        text: String,
        from: String,
        to: String,
    ) -> ServiceFuture<Result<String, GatewayError>> {
        let client = self.client.clone();
        let url = self.endpoint("translate");
        let api_key = self.config.api_key.clone();
        Box::pin(async move {
            let mut body = json!({
                "q": text,
                "source": from,
                "target": to,
                "format": "text",
            });
            if let Some(key) = api_key {
                body["api_key"] = json!(key);
            }

            let response = client.post(&url).json(&body).send().await?;
            let status = response.status();
            let payload = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(service_error(status.as_u16(), &payload));
            }
            parse_translate_response(&payload)
        })
    }
}

async fn detect_request(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
    text: &str,
) -> Result<String, GatewayError> {
    let mut body = json!({ "q": text });
    if let Some(key) = api_key {
        body["api_key"] = json!(key);
    }

    let response = client.post(url).json(&body).send().await?;
    let status = response.status();
    let payload = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(service_error(status.as_u16(), &payload));
    }
    parse_detect_response(&payload)
}

/// The detect endpoint returns a confidence-ranked list; the top entry wins.
fn parse_detect_response(body: &str) -> Result<String, GatewayError> {
    let candidates: Vec<DetectCandidate> = serde_json::from_str(body)
        .map_err(|err| GatewayError::Malformed(err.to_string()))?;
    candidates
        .first()
        .map(|candidate| candidate.language.clone())
        .ok_or_else(|| GatewayError::Malformed("empty detection result".to_string()))
}

fn parse_translate_response(body: &str) -> Result<String, GatewayError> {
    let parsed: TranslateResponse =
        serde_json::from_str(body).map_err(|err| GatewayError::Malformed(err.to_string()))?;
    if parsed.translated_text.is_empty() {
        return Err(GatewayError::Malformed(
            "empty translatedText in response".to_string(),
        ));
    }
    Ok(parsed.translated_text)
}

fn service_error(status: u16, body: &str) -> GatewayError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });
    GatewayError::Service { status, message }
}

#[derive(Debug, Deserialize)]
struct DetectCandidate {
    language: String,
    #[serde(default)]
    #[allow(dead_code)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}
