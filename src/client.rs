use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_CANDIDATE_TOKENS, CLIENT_PROMPT_TOKENS, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS,
    CLIENT_REQUESTS,
};
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["WILLLM_API_KEY", "GEMINI_API_KEY"];

/// Client for the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the `WILLLM_API_KEY`
    /// or `GEMINI_API_KEY` environment variables.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => api_key_from_env().ok_or_else(|| {
                Error::authentication(
                    "API key not provided and neither WILLLM_API_KEY nor GEMINI_API_KEY is set",
                )
            })?,
        };
        if HeaderValue::from_str(&api_key).is_err() {
            return Err(Error::validation(
                "API key contains characters not allowed in a header",
                Some("api_key".to_string()),
            ));
        }

        let mut base = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        // Url::join drops the last path segment unless the base ends in '/'.
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
        })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The transport timeout applied to each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, model: &Model) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("models/{model}:generateContent"))?)
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            Error::validation("API key is not a valid header value", Some("api_key".to_string()))
        })?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response, model: &Model) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let (message, status) = parse_error_body(&error_body);

        match status_code {
            400 => Error::bad_request(message, status),
            401 => Error::authentication(message),
            403 => Error::permission(message),
            404 => Error::not_found(message, Some(model.to_string())),
            408 => Error::timeout(message, None),
            429 => Error::rate_limit(message, retry_after),
            500 => Error::internal_server(message),
            502..=504 => Error::service_unavailable(message, retry_after),
            _ => Error::api(status_code, status, message),
        }
    }

    /// Generate content for a model and return the full response.
    pub async fn generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.generate_content_inner(model, request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        match &result {
            Ok(response) => {
                if let Some(usage) = response.usage_metadata {
                    CLIENT_PROMPT_TOKENS.count(usage.prompt_token_count);
                    CLIENT_CANDIDATE_TOKENS.count(usage.candidates_token_count);
                }
            }
            Err(_) => CLIENT_REQUEST_ERRORS.click(),
        }
        result
    }

    async fn generate_content_inner(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model)?;

        let response = self
            .client
            .post(url)
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response, model).await);
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                Error::serialization(
                    format!("Failed to parse response: {}", e),
                    Some(Box::new(e)),
                )
            })
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}

/// Returns the name of the environment variable the key would come from.
pub fn api_key_source() -> Option<&'static str> {
    API_KEY_VARS.into_iter().find(|var| {
        env::var(var)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    })
}

/// Extract message and RPC status from a Google error body.
///
/// Falls back to the raw body when it is not the documented JSON shape.
fn parse_error_body(body: &str) -> (String, Option<String>) {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
        status: Option<String>,
    }

    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|parsed| parsed.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.to_string());
    let status = detail.and_then(|d| d.status);
    (message, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;

    #[test]
    fn client_creation() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url.as_str(), DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = Gemini::with_options(
            Some("test-key".to_string()),
            Some("https://proxy.example.com/gemini/v1".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url.as_str(), "https://proxy.example.com/gemini/v1/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = Gemini::with_options(Some("k".to_string()), Some("not a url".to_string()), None)
            .unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn rejects_key_with_newline() {
        let err = Gemini::new(Some("bad\nkey".to_string())).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn endpoint_for_model() {
        let client = Gemini::new(Some("k".to_string())).unwrap();
        let url = client
            .endpoint(&Model::Known(KnownModel::Gemini20Flash))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn headers_carry_key() {
        let client = Gemini::new(Some("secret".to_string())).unwrap();
        let headers = client.default_headers().unwrap();
        assert_eq!(headers.get("x-goog-api-key").unwrap(), "secret");
    }

    #[test]
    fn google_error_body() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let (message, status) = parse_error_body(body);
        assert_eq!(message, "API key not valid.");
        assert_eq!(status.as_deref(), Some("INVALID_ARGUMENT"));

        let (message, status) = parse_error_body("<html>bad gateway</html>");
        assert_eq!(message, "<html>bad gateway</html>");
        assert!(status.is_none());
    }

    fn error_response(status: u16, retry_after: Option<&str>, body: &str) -> Response {
        let mut builder = http::Response::builder().status(status);
        if let Some(value) = retry_after {
            builder = builder.header("retry-after", value);
        }
        Response::from(builder.body(body.to_string()).unwrap())
    }

    async fn mapped(status: u16, retry_after: Option<&str>) -> Error {
        let body = r#"{"error": {"code": 0, "message": "nope", "status": "SOME_STATUS"}}"#;
        let model = Model::Known(KnownModel::Gemini20Flash);
        Gemini::process_error_response(error_response(status, retry_after, body), &model).await
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        match mapped(400, None).await {
            Error::BadRequest { message, status } => {
                assert_eq!(message, "nope");
                assert_eq!(status.as_deref(), Some("SOME_STATUS"));
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
        assert!(matches!(mapped(401, None).await, Error::Authentication { .. }));
        assert!(matches!(mapped(403, None).await, Error::Permission { .. }));
        match mapped(404, None).await {
            Error::NotFound { model, .. } => {
                assert_eq!(model.as_deref(), Some("gemini-2.0-flash"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(matches!(mapped(408, None).await, Error::Timeout { .. }));
        assert!(matches!(mapped(500, None).await, Error::InternalServer { .. }));
        match mapped(418, None).await {
            Error::Api {
                status_code,
                status,
                message,
            } => {
                assert_eq!(status_code, 418);
                assert_eq!(status.as_deref(), Some("SOME_STATUS"));
                assert_eq!(message, "nope");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn retry_after_is_kept() {
        match mapped(429, Some("7")).await {
            Error::RateLimit { retry_after, .. } => assert_eq!(retry_after, Some(7)),
            other => panic!("expected RateLimit, got {other:?}"),
        }
        match mapped(429, Some("soon")).await {
            Error::RateLimit { retry_after, .. } => assert_eq!(retry_after, None),
            other => panic!("expected RateLimit, got {other:?}"),
        }
        for status in [502, 503, 504] {
            match mapped(status, Some("7")).await {
                Error::ServiceUnavailable { retry_after, .. } => {
                    assert_eq!(retry_after, Some(7))
                }
                other => panic!("expected ServiceUnavailable for {status}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    #[ignore] // Ignore by default as this requires a real API key
    async fn generate_content_live() {
        let Ok(client) = Gemini::new(None) else {
            println!("Skipping generate_content_live: no API key set");
            return;
        };
        let request = GenerateContentRequest::from_prompt("Reply with the single word: pong");
        let response = client
            .generate_content(&Model::default(), &request)
            .await
            .unwrap();
        assert!(!response.text().unwrap().is_empty());
    }
}
