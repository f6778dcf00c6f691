use crate::event::AppEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, Weak};

pub mod handoff;

pub use handoff::HandoffBridge;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSession {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub color_scheme: ColorScheme,
    #[serde(default)]
    pub viewport_height: f32,
    #[serde(default)]
    pub viewport_stable_height: f32,
    #[serde(default)]
    pub init_data: String,
    #[serde(default)]
    pub is_expanded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Impact,
    Success,
    Error,
}

pub trait HostBridge: Send + Sync {
    fn user(&self) -> Option<SessionUser>;
    fn session(&self) -> Option<BridgeSession>;
    fn signal_ready(&self);
    fn request_expand(&self);
    fn haptic(&self, kind: HapticKind);
    /// Returns whether the host displayed the popup; callers fall back to
    /// their own surface when it did not.
    fn show_popup(&self, title: &str, message: &str) -> bool;
    fn close(&self);
    fn subscribe_theme(&self, tx: Sender<AppEvent>) -> ThemeSubscription;
    fn notify_theme_changed(&self, scheme: ColorScheme);
}

#[derive(Default)]
pub struct ThemeHub {
    subscribers: Mutex<HashMap<u64, Sender<AppEvent>>>,
    next_id: AtomicU64,
}

impl ThemeHub {
    pub fn subscribe(hub: &Arc<Self>, tx: Sender<AppEvent>) -> ThemeSubscription {
        let id = hub.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut subscribers) = hub.subscribers.lock() {
            subscribers.insert(id, tx);
        }
        ThemeSubscription {
            id,
            hub: Arc::downgrade(hub),
        }
    }

    pub fn notify(&self, scheme: ColorScheme) {
        if let Ok(subscribers) = self.subscribers.lock() {
            for tx in subscribers.values() {
                let _ = tx.send(AppEvent::ThemeChanged(scheme));
            }
        }
    }

    fn unsubscribe(&self, id: u64) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.remove(&id);
        }
    }
}

pub struct ThemeSubscription {
    id: u64,
    hub: Weak<ThemeHub>,
}

impl Drop for ThemeSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unsubscribe(self.id);
        }
    }
}
