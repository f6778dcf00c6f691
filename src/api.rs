use crate::bridge::HostBridge;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const USER_ID_HEADER: &str = "X-Telegram-User-Id";
pub const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";
pub const PLATFORM_HEADER: &str = "X-Telegram-Platform";

pub const DATA_ENDPOINT: &str = "/api/webapp-data";
pub const STATUS_ENDPOINT: &str = "/api/bot-status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    #[default]
    Unknown,
    Online,
    Offline,
}

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("network error: {0}")]
    Network(String),
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Option<i64>,
    pub init_data: String,
    pub platform: String,
}

impl Identity {
    pub fn from_bridge(bridge: &dyn HostBridge) -> Self {
        let user_id = bridge.user().map(|user| user.id);
        let (init_data, platform) = match bridge.session() {
            Some(session) if !session.platform.is_empty() => {
                (session.init_data, session.platform)
            }
            Some(session) => (session.init_data, "unknown".to_string()),
            None => (String::new(), "unknown".to_string()),
        };
        Self {
            user_id,
            init_data,
            platform,
        }
    }

    pub fn user_id_header(&self) -> String {
        self.user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    identity: Identity,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, identity: Identity) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
            timeout,
            identity,
        }
    }

    /// Soft check: never fails, only reports what it saw.
    pub async fn probe(&self) -> (ConnectivityState, String) {
        let url = format!("{}{STATUS_ENDPOINT}", self.base_url);
        match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(body) => evaluate_probe(status, &body),
                    Err(err) => (
                        ConnectivityState::Offline,
                        format!("failed to read status body: {err}"),
                    ),
                }
            }
            Err(err) => (
                ConnectivityState::Offline,
                format!("connection failed: {err}"),
            ),
        }
    }

    pub async fn send(&self, endpoint: &str, payload: &Value) -> Result<Value, ApiError> {
        let url = format!("{}{endpoint}", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(USER_ID_HEADER, self.identity.user_id_header())
            .header(INIT_DATA_HEADER, self.identity.init_data.as_str())
            .header(PLATFORM_HEADER, self.identity.platform.as_str())
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| self.classify_transport(err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.classify_transport(err))?;
        evaluate_send(status, &body)
    }

    fn classify_transport(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout.as_secs())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

fn evaluate_send(status: StatusCode, body: &str) -> Result<Value, ApiError> {
    if status.is_success() {
        serde_json::from_str(body).map_err(|err| ApiError::MalformedBody(err.to_string()))
    } else {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("server error ({status})"));
        Err(ApiError::Rejected(message))
    }
}

fn evaluate_probe(status: StatusCode, body: &str) -> (ConnectivityState, String) {
    if !status.is_success() {
        return (
            ConnectivityState::Offline,
            format!("status endpoint returned {status}"),
        );
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            let reported = value.get("status").and_then(Value::as_str);
            if reported == Some("online") {
                (
                    ConnectivityState::Online,
                    "API connection established".to_string(),
                )
            } else {
                (
                    ConnectivityState::Offline,
                    format!("API reported status {:?}", reported.unwrap_or("missing")),
                )
            }
        }
        Err(err) => (
            ConnectivityState::Offline,
            format!("unreadable status body: {err}"),
        ),
    }
}
