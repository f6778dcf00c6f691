use crate::api::{ApiClient, DATA_ENDPOINT};
use crate::bridge::{BridgeSession, SessionUser};
use crate::event::AppEvent;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn action_payload(
    action: &str,
    user: Option<&SessionUser>,
    session: Option<&BridgeSession>,
) -> Value {
    json!({
        "action": action,
        "user_id": user.map(|user| user.id),
        "user_name": user.map(|user| user.first_name.clone()),
        "timestamp": now_rfc3339(),
        "platform": session.map(|session| session.platform.clone()),
        "version": session.map(|session| session.version.clone()),
    })
}

pub fn custom_payload(raw: &str, user: Option<&SessionUser>) -> Result<Value, serde_json::Error> {
    let data: Value = serde_json::from_str(raw)?;
    Ok(json!({
        "action": "custom",
        "data": data,
        "user_id": user.map(|user| user.id),
        "timestamp": now_rfc3339(),
    }))
}

pub fn session_snapshot_payload(
    user: Option<&SessionUser>,
    session: Option<&BridgeSession>,
) -> Value {
    json!({
        "action": "user_data",
        "user": user,
        "bridge": session,
        "timestamp": now_rfc3339(),
    })
}

#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<ApiClient>,
    tx: Sender<AppEvent>,
    runtime_handle: Handle,
}

impl Dispatcher {
    pub fn new(api: Arc<ApiClient>, tx: Sender<AppEvent>) -> anyhow::Result<Self> {
        let runtime_handle = Handle::try_current()
            .map_err(|err| anyhow::anyhow!("tokio runtime unavailable: {err}"))?;
        Ok(Self {
            api,
            tx,
            runtime_handle,
        })
    }

    pub fn probe_connectivity(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let (state, detail) = api.probe().await;
            let _ = tx.send(AppEvent::ConnectivityProbed { state, detail });
        });
    }

    /// Fire-and-forget: the outcome comes back as an `AppEvent`, nothing
    /// propagates further.
    pub fn dispatch(&self, action: &str, payload: Value) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let action = action.to_string();
        self.runtime_handle.spawn(async move {
            match api.send(DATA_ENDPOINT, &payload).await {
                Ok(reply) => {
                    let _ = tx.send(AppEvent::SendSucceeded {
                        action,
                        reply: reply.to_string(),
                    });
                }
                Err(error) => {
                    let _ = tx.send(AppEvent::SendFailed { action, error });
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{action_payload, custom_payload, session_snapshot_payload, Dispatcher};
    use crate::api::{ApiClient, Identity};
    use crate::bridge::{BridgeSession, ColorScheme, SessionUser};
    use crate::event::AppEvent;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    fn sample_user() -> SessionUser {
        SessionUser {
            id: 42,
            first_name: "Ada".to_string(),
            last_name: None,
            username: None,
            language_code: None,
            is_premium: false,
        }
    }

    fn sample_session() -> BridgeSession {
        BridgeSession {
            platform: "tdesktop".to_string(),
            version: "8.0".to_string(),
            color_scheme: ColorScheme::Light,
            viewport_height: 720.0,
            viewport_stable_height: 700.0,
            init_data: "query_id=abc".to_string(),
            is_expanded: false,
        }
    }

    #[test]
    fn action_payload_carries_identity_platform_and_timestamp() {
        let payload = action_payload("main_button", Some(&sample_user()), Some(&sample_session()));

        assert_eq!(payload["action"], "main_button");
        assert_eq!(payload["user_id"], 42);
        assert_eq!(payload["user_name"], "Ada");
        assert_eq!(payload["platform"], "tdesktop");
        assert_eq!(payload["version"], "8.0");
        assert!(payload["timestamp"].as_str().is_some_and(|ts| !ts.is_empty()));
    }

    #[test]
    fn action_payload_tolerates_a_detached_bridge() {
        let payload = action_payload("main_button", None, None);
        assert_eq!(payload["action"], "main_button");
        assert!(payload["user_id"].is_null());
        assert!(payload["platform"].is_null());
    }

    #[test]
    fn custom_payload_wraps_parsed_user_json() {
        let payload =
            custom_payload(r#"{"a":1}"#, Some(&sample_user())).expect("valid JSON should parse");

        assert_eq!(payload["action"], "custom");
        assert_eq!(payload["data"]["a"], 1);
        assert_eq!(payload["user_id"], 42);
        assert!(payload["timestamp"].as_str().is_some());
    }

    #[test]
    fn custom_payload_rejects_invalid_json_locally() {
        assert!(custom_payload("not-json", Some(&sample_user())).is_err());
    }

    #[test]
    fn session_snapshot_serializes_the_full_known_state() {
        let payload = session_snapshot_payload(Some(&sample_user()), Some(&sample_session()));

        assert_eq!(payload["action"], "user_data");
        assert_eq!(payload["user"]["first_name"], "Ada");
        assert_eq!(payload["bridge"]["init_data"], "query_id=abc");
        assert_eq!(payload["bridge"]["color_scheme"], "light");
    }

    #[tokio::test]
    async fn dispatch_reports_failures_as_events_instead_of_propagating() {
        let refused_addr = {
            let probe =
                std::net::TcpListener::bind("127.0.0.1:0").expect("loopback bind should succeed");
            probe
                .local_addr()
                .expect("bound socket should have an address")
        };
        let api = Arc::new(ApiClient::new(
            format!("http://{refused_addr}"),
            Duration::from_secs(5),
            Identity {
                user_id: None,
                init_data: String::new(),
                platform: "unknown".to_string(),
            },
        ));
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(api, tx).expect("runtime should be available");

        dispatcher.dispatch("main_button", action_payload("main_button", None, None));

        let event = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(10)))
            .await
            .expect("receiver task should not panic")
            .expect("outcome event should arrive");
        match event {
            AppEvent::SendFailed { action, .. } => assert_eq!(action, "main_button"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
