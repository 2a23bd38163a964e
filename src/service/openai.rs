//! OpenAI互換 Chat Completions API クライアント

use super::{ChatRequest, ContentPart, Role, VisionService};
use crate::config::Config;
use crate::error::{ArtworkMatchError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// APIリクエスト
#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ApiPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

/// APIレスポンス
#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl<'a> ApiRequest<'a> {
    fn new(model: &'a str, request: ChatRequest) -> Self {
        let messages = request
            .messages
            .into_iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                },
                content: m
                    .content
                    .into_iter()
                    .map(|part| match part {
                        ContentPart::Text(text) => ApiPart::Text { text },
                        ContentPart::ImageUrl(url) => ApiPart::ImageUrl {
                            image_url: ImageUrl { url },
                        },
                    })
                    .collect(),
            })
            .collect();

        Self {
            model,
            max_tokens: request.max_tokens,
            messages,
        }
    }
}

/// エラーレスポンスからメッセージを取り出す（JSONでなければ本文そのまま）
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.chars().take(500).collect())
}

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ArtworkMatchError::ServiceCall(format!("HTTPクライアント初期化エラー: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// 設定から生成（APIキーが無ければここで失敗する）
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        Self::new(api_key, &config.model, &config.base_url, config.timeout())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl VisionService for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let with_image = request.has_image();
        let body = ApiRequest::new(&self.model, request);

        tracing::debug!(model = %self.model, with_image, max_tokens = body.max_tokens, "APIリクエスト送信");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ArtworkMatchError::ServiceCall(format!("タイムアウト: {}", e))
                } else {
                    ArtworkMatchError::ServiceCall(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ArtworkMatchError::ServiceCall(e.to_string()))?;

        if !status.is_success() {
            return Err(ArtworkMatchError::ServiceCall(format!(
                "HTTP {}: {}",
                status,
                api_error_message(&text)
            )));
        }

        let payload: ApiResponse = serde_json::from_str(&text)
            .map_err(|e| ArtworkMatchError::ServiceResponse(format!("JSONパースエラー: {}", e)))?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ArtworkMatchError::ServiceResponse("応答テキストが空です".into()))?;

        tracing::debug!(chars = content.len(), "APIレスポンス受信");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ChatMessage;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer, timeout: Duration) -> OpenAiClient {
        OpenAiClient::new("TEST", "gpt-4o", server.base_url(), timeout).unwrap()
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            max_tokens: 20,
            messages: vec![ChatMessage {
                role: Role::User,
                content: vec![
                    ContentPart::Text("hi".into()),
                    ContentPart::ImageUrl("data:image/jpeg;base64,AAAA".into()),
                ],
            }],
        }
        .with_system("rules");

        let value = serde_json::to_value(ApiRequest::new("gpt-4o", request)).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o",
                "max_tokens": 20,
                "messages": [
                    {"role": "system", "content": [{"type": "text", "text": "rules"}]},
                    {"role": "user", "content": [
                        {"type": "text", "text": "hi"},
                        {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,AAAA"}}
                    ]}
                ]
            })
        );
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Incorrect API key provided");
        assert_eq!(api_error_message("bad gateway"), "bad gateway");
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("Authorization", "Bearer TEST")
                    .json_body(json!({
                        "model": "gpt-4o",
                        "max_tokens": 20,
                        "messages": [
                            {"role": "user", "content": [{"type": "text", "text": "Which artwork?"}]}
                        ]
                    }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "choices": [{"index": 0, "message": {"role": "assistant", "content": "  Mona Lisa\n"}}]
                    }));
            })
            .await;

        let reply = client(&server, Duration::from_secs(5))
            .complete(ChatRequest::text("Which artwork?", 20))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Mona Lisa");
    }

    #[tokio::test]
    async fn test_complete_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401)
                    .header("content-type", "application/json")
                    .json_body(json!({"error": {"message": "Incorrect API key provided"}}));
            })
            .await;

        let err = client(&server, Duration::from_secs(5))
            .complete(ChatRequest::text("x", 5))
            .await
            .unwrap_err();

        assert!(matches!(err, ArtworkMatchError::ServiceCall(_)));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).body("not json");
            })
            .await;

        let err = client(&server, Duration::from_secs(5))
            .complete(ChatRequest::text("x", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, ArtworkMatchError::ServiceResponse(_)));
    }

    #[tokio::test]
    async fn test_complete_empty_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .json_body(json!({"choices": [{"message": {"content": null}}]}));
            })
            .await;

        let err = client(&server, Duration::from_secs(5))
            .complete(ChatRequest::text("x", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, ArtworkMatchError::ServiceResponse(_)));
    }

    #[tokio::test]
    async fn test_complete_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({"choices": [{"message": {"content": "Mona Lisa"}}]}));
            })
            .await;

        let err = client(&server, Duration::from_millis(200))
            .complete(ChatRequest::text("x", 5))
            .await
            .unwrap_err();
        assert!(err.is_service_failure());
    }

    #[test]
    fn test_from_config_requires_api_key() {
        // 環境変数を参照するテストはこれだけ
        std::env::remove_var(crate::config::API_KEY_ENV);

        let config = Config {
            api_key: None,
            ..Default::default()
        };
        let result = OpenAiClient::from_config(&config);
        assert!(matches!(result, Err(ArtworkMatchError::MissingApiKey)));

        let config = Config {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(OpenAiClient::from_config(&config), Err(ArtworkMatchError::MissingApiKey)));

        let config = Config {
            api_key: Some("sk-file".into()),
            model: "gpt-4o-mini".into(),
            ..Default::default()
        };
        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "gpt-4o-mini");
    }
}
