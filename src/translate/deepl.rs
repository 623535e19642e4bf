use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::interface::{TranslateError, TranslateInterface, TranslateRequest, TranslateResponse};

const FREE_API_URL: &str = "https://api-free.deepl.com";
const PRO_API_URL: &str = "https://api.deepl.com";

/// DeepL returns 456 once the account's character quota is used up
const QUOTA_EXCEEDED: u16 = 456;

#[derive(Debug, Serialize)]
struct DeepLRequest<'a> {
    text: [&'a str; 1],
    target_lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
    detected_source_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeepLErrorBody {
    message: Option<String>,
}

/// Translation client for the DeepL v2 REST API
pub struct DeepLClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl DeepLClient {
    pub fn new(client: Client, api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| default_base_url(&api_key).to_string())
            .trim_end_matches('/')
            .to_string();
        info!("Initialized DeepL client: base_url={}", base_url);
        Self {
            client,
            api_key,
            base_url,
        }
    }
}

/// Free-tier keys carry a `:fx` suffix and must use the free endpoint
fn default_base_url(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        FREE_API_URL
    } else {
        PRO_API_URL
    }
}

#[async_trait]
impl TranslateInterface for DeepLClient {
    async fn translate(&self, request: &TranslateRequest) -> Result<TranslateResponse, TranslateError> {
        let url = format!("{}/v2/translate", self.base_url);
        let body = DeepLRequest {
            text: [request.text.as_str()],
            target_lang: &request.target_lang,
            source_lang: request.source_lang.as_deref(),
        };

        debug!("Sending DeepL request: chars={}, target_lang={}", request.text.len(), request.target_lang);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(TranslateError::Unauthorized);
        }
        if status.as_u16() == QUOTA_EXCEEDED {
            return Err(TranslateError::QuotaExceeded);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<DeepLErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(text);
            return Err(TranslateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let result: DeepLResponse = response.json().await?;
        let translation = result
            .translations
            .into_iter()
            .next()
            .ok_or(TranslateError::EmptyResponse)?;

        Ok(TranslateResponse {
            translated_text: translation.text,
            detected_source_language: translation.detected_source_language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn spanish(text: &str) -> TranslateRequest {
        TranslateRequest {
            text: text.to_string(),
            source_lang: None,
            target_lang: "ES".to_string(),
        }
    }

    #[test]
    fn free_keys_use_free_endpoint() {
        assert_eq!(default_base_url("abc:fx"), FREE_API_URL);
        assert_eq!(default_base_url("abc"), PRO_API_URL);
    }

    #[tokio::test]
    async fn translates_single_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/translate"))
            .and(header("Authorization", "DeepL-Auth-Key test-key"))
            .and(body_json(json!({"text": ["hello"], "target_lang": "ES"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "translations": [{"detected_source_language": "EN", "text": "hola"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DeepLClient::new(Client::new(), "test-key".to_string(), Some(server.uri()));
        let response = client.translate(&spanish("hello")).await.unwrap();

        assert_eq!(response.translated_text, "hola");
        assert_eq!(response.detected_source_language.as_deref(), Some("EN"));
    }

    #[tokio::test]
    async fn maps_auth_and_quota_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "DeepL-Auth-Key bad-key"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(header("Authorization", "DeepL-Auth-Key spent-key"))
            .respond_with(ResponseTemplate::new(456))
            .mount(&server)
            .await;

        let bad = DeepLClient::new(Client::new(), "bad-key".to_string(), Some(server.uri()));
        assert!(matches!(
            bad.translate(&spanish("hello")).await,
            Err(TranslateError::Unauthorized)
        ));

        let spent = DeepLClient::new(Client::new(), "spent-key".to_string(), Some(server.uri()));
        assert!(matches!(
            spent.translate(&spanish("hello")).await,
            Err(TranslateError::QuotaExceeded)
        ));
    }

    #[tokio::test]
    async fn surfaces_server_message_on_other_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Value for 'target_lang' not supported."})))
            .mount(&server)
            .await;

        let client = DeepLClient::new(Client::new(), "k".to_string(), Some(server.uri()));
        let err = client.translate(&spanish("hello")).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "DeepL returned status 400: Value for 'target_lang' not supported."
        );
    }

    #[tokio::test]
    async fn empty_translation_list_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translations": []})))
            .mount(&server)
            .await;

        let client = DeepLClient::new(Client::new(), "k".to_string(), Some(server.uri()));
        assert!(matches!(
            client.translate(&spanish("hello")).await,
            Err(TranslateError::EmptyResponse)
        ));
    }
}
