use crate::bridge::{
    BridgeSession, ColorScheme, HapticKind, HostBridge, SessionUser, ThemeHub, ThemeSubscription,
};
use crate::event::AppEvent;
use serde::Deserialize;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Launch payload the embedding host hands over when it starts the app.
pub const HANDOFF_ENV: &str = "MINIBRIDGE_HANDOFF";

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchHandoff {
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(flatten)]
    pub session: BridgeSession,
}

pub struct HandoffBridge {
    handoff: Option<LaunchHandoff>,
    theme: Arc<ThemeHub>,
}

impl HandoffBridge {
    pub fn from_env() -> Self {
        match std::env::var(HANDOFF_ENV) {
            Ok(raw) => Self::from_payload(&raw),
            Err(_) => Self::detached(),
        }
    }

    pub fn from_payload(raw: &str) -> Self {
        match serde_json::from_str::<LaunchHandoff>(raw) {
            Ok(handoff) => Self {
                handoff: Some(handoff),
                theme: Arc::new(ThemeHub::default()),
            },
            Err(err) => {
                warn!("malformed launch handoff, running detached: {err}");
                Self::detached()
            }
        }
    }

    pub fn detached() -> Self {
        Self {
            handoff: None,
            theme: Arc::new(ThemeHub::default()),
        }
    }
}

impl HostBridge for HandoffBridge {
    fn user(&self) -> Option<SessionUser> {
        self.handoff.as_ref().and_then(|handoff| handoff.user.clone())
    }

    fn session(&self) -> Option<BridgeSession> {
        self.handoff.as_ref().map(|handoff| handoff.session.clone())
    }

    fn signal_ready(&self) {
        debug!("ready signalled to host");
    }

    fn request_expand(&self) {
        debug!("layout expansion requested");
    }

    fn haptic(&self, kind: HapticKind) {
        debug!("haptic requested: {kind:?}");
    }

    fn show_popup(&self, title: &str, message: &str) -> bool {
        // A handoff host has no live popup surface.
        debug!("popup declined by host: {title}: {message}");
        false
    }

    fn close(&self) {
        info!("close requested by user");
    }

    fn subscribe_theme(&self, tx: Sender<AppEvent>) -> ThemeSubscription {
        ThemeHub::subscribe(&self.theme, tx)
    }

    fn notify_theme_changed(&self, scheme: ColorScheme) {
        self.theme.notify(scheme);
    }
}
