use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::config::AppConfig;
use crate::{ClientError, ClientResult};

/// Upstream answer. Known parts are typed; anything else the service returns
/// is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(config: &AppConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.chat_timeout)
            .build()
            .map_err(|err| ClientError::chat_transport_failed(&err.to_string()))?;
        Ok(Self {
            http,
            endpoint: config.chat_endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn ask(&self, query: &str) -> ClientResult<ChatResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::invalid_argument_for_command(
                "Query is required",
                Some("chat"),
            ));
        }

        debug!(endpoint = %self.endpoint, "sending chat query");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ChatRequest { query })
            .send()
            .map_err(|err| {
                error!(endpoint = %self.endpoint, error = %err, "chat request failed");
                ClientError::chat_transport_failed(&err.to_string())
            })?;

        let status = response.status();
        let body = response.text().map_err(|err| {
            error!(error = %err, "could not read chat response body");
            ClientError::chat_transport_failed(&err.to_string())
        })?;

        if !status.is_success() {
            error!(status = status.as_u16(), details = %body, "text-to-SQL service error");
            return Err(ClientError::chat_upstream_failed(status.as_u16(), &body));
        }

        serde_json::from_str::<ChatResponse>(&body).map_err(|err| {
            error!(error = %err, "text-to-SQL service returned an unreadable body");
            ClientError::chat_transport_failed(&format!("Invalid response body: {err}"))
        })
    }
}
