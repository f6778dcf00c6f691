use crate::api::{ApiError, ConnectivityState};
use crate::bridge::{
    BridgeSession, ColorScheme, HapticKind, HostBridge, SessionUser, ThemeSubscription,
};
use crate::dispatch::{self, Dispatcher};
use crate::event::{AppEvent, EventLog, LogLevel};
use crate::theme::Theme;
use crate::view::{self, UserPanel};
use eframe::egui::{self, Color32, RichText, ScrollArea, TextStyle};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

struct Modal {
    title: String,
    message: String,
}

pub struct MinibridgeApp {
    rx: Receiver<AppEvent>,
    dispatcher: Dispatcher,
    bridge: Arc<dyn HostBridge>,
    _theme_subscription: ThemeSubscription,
    user: Option<SessionUser>,
    session: Option<BridgeSession>,
    theme: Theme,
    api_state: ConnectivityState,
    event_log: EventLog,
    custom_form_open: bool,
    custom_input: String,
    modal: Option<Modal>,
    scroll_to_bottom: bool,
    visuals_applied: bool,
    last_system_theme: Option<ColorScheme>,
}

impl MinibridgeApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        tx: Sender<AppEvent>,
        dispatcher: Dispatcher,
        bridge: Arc<dyn HostBridge>,
    ) -> Self {
        bridge.signal_ready();
        bridge.request_expand();

        let user = bridge.user();
        let session = bridge.session();
        let scheme = session
            .as_ref()
            .map(|session| session.color_scheme)
            .unwrap_or_default();
        let theme_subscription = bridge.subscribe_theme(tx);

        let mut app = Self {
            rx,
            dispatcher,
            bridge,
            _theme_subscription: theme_subscription,
            user,
            session,
            theme: Theme::from_scheme(scheme),
            api_state: ConnectivityState::Unknown,
            event_log: EventLog::default(),
            custom_form_open: false,
            custom_input: String::new(),
            modal: None,
            scroll_to_bottom: true,
            visuals_applied: false,
            last_system_theme: None,
        };

        app.log_event(LogLevel::Success, "✅ Mini app client loaded");
        let platform = app
            .session
            .as_ref()
            .map(|session| session.platform.clone())
            .filter(|platform| !platform.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        app.log_event(LogLevel::Info, format!("📱 Platform: {platform}"));
        let user_id = app
            .user
            .as_ref()
            .map(|user| user.id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        app.log_event(LogLevel::Info, format!("🆔 User ID: {user_id}"));

        app.dispatcher.probe_connectivity();
        app
    }

    fn log_event(&mut self, level: LogLevel, message: impl Into<String>) {
        self.event_log.append(level, message);
        self.scroll_to_bottom = true;
    }

    fn connectivity_badge(&self) -> (&'static str, Color32) {
        let label = view::connectivity_label(self.api_state);
        let color = match self.api_state {
            ConnectivityState::Online => self.theme.success,
            ConnectivityState::Offline => self.theme.danger,
            ConnectivityState::Unknown => self.theme.text_muted,
        };
        (label, color)
    }

    fn dispatch_action(&mut self, action: &str) {
        self.log_event(LogLevel::Info, format!("🔄 Action: {action}"));
        self.bridge.haptic(HapticKind::Impact);
        let payload = dispatch::action_payload(action, self.user.as_ref(), self.session.as_ref());
        self.dispatcher.dispatch(action, payload);
    }

    fn submit_custom_json(&mut self) {
        match dispatch::custom_payload(self.custom_input.trim(), self.user.as_ref()) {
            Ok(payload) => {
                self.log_event(LogLevel::Info, "🔄 Action: custom");
                self.bridge.haptic(HapticKind::Impact);
                self.dispatcher.dispatch("custom", payload);
                self.hide_custom_form();
            }
            Err(err) => {
                self.log_event(LogLevel::Error, format!("❌ JSON parse error: {err}"));
                let alert = "The custom payload must be valid JSON";
                if !self.bridge.show_popup("Invalid JSON", alert) {
                    self.modal = Some(Modal {
                        title: "Invalid JSON".to_string(),
                        message: alert.to_string(),
                    });
                }
            }
        }
    }

    fn send_session_snapshot(&mut self) {
        self.log_event(LogLevel::Info, "🔄 Action: user_data");
        self.bridge.haptic(HapticKind::Impact);
        let payload =
            dispatch::session_snapshot_payload(self.user.as_ref(), self.session.as_ref());
        self.dispatcher.dispatch("user_data", payload);
    }

    fn test_connection(&mut self) {
        self.api_state = ConnectivityState::Unknown;
        self.dispatcher.probe_connectivity();
    }

    fn hide_custom_form(&mut self) {
        self.custom_form_open = false;
        self.custom_input.clear();
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_event(LogLevel::Warning, "event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ThemeChanged(scheme) => {
                self.theme = Theme::from_scheme(scheme);
                self.visuals_applied = false;
            }
            AppEvent::ConnectivityProbed { state, detail } => {
                self.api_state = state;
                match state {
                    ConnectivityState::Online => {
                        self.log_event(LogLevel::Success, format!("🔌 {detail}"));
                    }
                    _ => {
                        self.log_event(LogLevel::Warning, format!("⚠️ API unavailable: {detail}"));
                    }
                }
            }
            AppEvent::SendSucceeded { action, reply } => {
                self.log_event(LogLevel::Success, format!("✅ {action} delivered: {reply}"));
                self.bridge.haptic(HapticKind::Success);
                if !self.bridge.show_popup("Success", "Data delivered!") {
                    self.modal = Some(Modal {
                        title: "Success".to_string(),
                        message: "Data delivered!".to_string(),
                    });
                }
            }
            AppEvent::SendFailed { action, error } => {
                let message = match &error {
                    ApiError::Timeout(secs) => {
                        format!("❌ {action} timed out after {secs}s")
                    }
                    other => format!("❌ {action} failed: {other}"),
                };
                self.log_event(LogLevel::Error, message);
                self.bridge.haptic(HapticKind::Error);
            }
        }
    }

    fn watch_system_theme(&mut self, ctx: &egui::Context) {
        let system = ctx.input(|input| input.raw.system_theme).map(|theme| match theme {
            egui::Theme::Dark => ColorScheme::Dark,
            egui::Theme::Light => ColorScheme::Light,
        });
        if let Some(scheme) = system {
            if self.last_system_theme != Some(scheme) {
                self.last_system_theme = Some(scheme);
                self.bridge.notify_theme_changed(scheme);
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let mut main_clicked = false;
        let mut close_clicked = false;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Minibridge");
                ui.separator();
                let (label, color) = self.connectivity_badge();
                ui.label(RichText::new(label).color(color));
                if let UserPanel::Known { badge, .. } = view::user_panel(self.user.as_ref()) {
                    ui.separator();
                    ui.label(badge);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    close_clicked = ui.button("Close").clicked();
                    main_clicked = ui.button(RichText::new("Done").strong()).clicked();
                });
            });
        });

        if main_clicked {
            self.log_event(LogLevel::Info, "Main button pressed");
            self.dispatch_action("main_button");
        }
        if close_clicked {
            self.bridge.close();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn render_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("session_panel")
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("User");
                self.theme.card_frame().show(ui, |ui| {
                    match view::user_panel(self.user.as_ref()) {
                        UserPanel::Known { rows, .. } => {
                            egui::Grid::new("user_info").num_columns(2).show(ui, |ui| {
                                for (label, value) in rows {
                                    ui.label(RichText::new(label).color(self.theme.text_muted));
                                    ui.label(value);
                                    ui.end_row();
                                }
                            });
                        }
                        UserPanel::Unavailable { headline, hint } => {
                            ui.label(RichText::new(headline).color(self.theme.warning));
                            ui.label(RichText::new(hint).color(self.theme.text_muted));
                        }
                    }
                });

                ui.separator();
                ui.heading("Bridge");
                self.theme.card_frame().show(ui, |ui| {
                    egui::Grid::new("session_info").num_columns(2).show(ui, |ui| {
                        for (label, value) in view::session_rows(self.session.as_ref()) {
                            ui.label(RichText::new(label).color(self.theme.text_muted));
                            ui.label(value);
                            ui.end_row();
                        }
                    });
                });
            });
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        let mut probe_clicked = false;
        let mut custom_clicked = false;
        let mut snapshot_clicked = false;
        let mut clear_clicked = false;
        let mut send_json_clicked = false;
        let mut cancel_clicked = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Console");
            ui.horizontal(|ui| {
                probe_clicked = ui.button("Test Connection").clicked();
                custom_clicked = ui.button("Send Custom Data").clicked();
                snapshot_clicked = ui.button("Send Session Data").clicked();
                clear_clicked = ui.button("Clear Log").clicked();
            });
            ui.separator();

            let reserved = if self.custom_form_open { 180.0 } else { 20.0 };
            let log_height = (ui.available_height() - reserved).max(120.0);
            ScrollArea::vertical()
                .id_salt("event_log")
                .max_height(log_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for entry in self.event_log.entries() {
                        ui.label(
                            RichText::new(format!("[{}] {}", entry.time, entry.message))
                                .color(self.theme.level_color(entry.level))
                                .monospace(),
                        );
                    }
                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            if self.custom_form_open {
                ui.separator();
                self.theme.composer_frame().show(ui, |ui| {
                    ui.label(RichText::new("Custom JSON payload").color(self.theme.text_muted));
                    ui.add(
                        egui::TextEdit::multiline(&mut self.custom_input)
                            .hint_text(r#"{"key": "value"}"#)
                            .desired_rows(4)
                            .desired_width(f32::INFINITY)
                            .font(TextStyle::Monospace),
                    );
                    ui.horizontal(|ui| {
                        send_json_clicked = ui.button("Send JSON").clicked();
                        cancel_clicked = ui.button("Cancel").clicked();
                    });
                });
            }
        });

        if probe_clicked {
            self.test_connection();
        }
        if custom_clicked {
            self.custom_form_open = true;
        }
        if snapshot_clicked {
            self.send_session_snapshot();
        }
        if clear_clicked {
            self.event_log.clear();
            self.scroll_to_bottom = true;
        }
        if send_json_clicked {
            self.submit_custom_json();
        }
        if cancel_clicked {
            self.hide_custom_form();
        }
    }

    fn render_modal(&mut self, ctx: &egui::Context) {
        let mut close_clicked = false;
        if let Some(modal) = &self.modal {
            egui::Window::new(modal.title.as_str())
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(modal.message.as_str());
                    close_clicked = ui.button("Close").clicked();
                });
        }
        if close_clicked {
            self.modal = None;
        }
    }
}

impl eframe::App for MinibridgeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.watch_system_theme(ctx);
        self.drain_events();
        if !self.visuals_applied {
            self.theme.apply_visuals(ctx);
            self.visuals_applied = true;
        }
        self.render_top_bar(ctx);
        self.render_side_panel(ctx);
        self.render_center_panel(ctx);
        self.render_modal(ctx);
        ctx.request_repaint_after(Duration::from_millis(200));
    }
}
