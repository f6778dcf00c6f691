use crate::api::ConnectivityState;
use crate::bridge::{BridgeSession, ColorScheme, SessionUser};

pub const ABSENT_PLACEHOLDER: &str = "none";
pub const PREMIUM_YES: &str = "✅";
pub const PREMIUM_NO: &str = "❌";

#[derive(Debug, Clone, PartialEq)]
pub enum UserPanel {
    Known {
        rows: Vec<(&'static str, String)>,
        badge: String,
    },
    Unavailable {
        headline: &'static str,
        hint: &'static str,
    },
}

pub fn user_panel(user: Option<&SessionUser>) -> UserPanel {
    match user {
        Some(user) => UserPanel::Known {
            rows: vec![
                ("ID", user.id.to_string()),
                ("Name", user.display_name()),
                ("Username", username_value(user)),
                ("Language", language_value(user)),
                ("Premium", premium_symbol(user.is_premium).to_string()),
            ],
            badge: format!("👋 {}", user.first_name),
        },
        None => UserPanel::Unavailable {
            headline: "⚠️ User data unavailable",
            hint: "Opened outside the host?",
        },
    }
}

pub fn premium_symbol(is_premium: bool) -> &'static str {
    if is_premium {
        PREMIUM_YES
    } else {
        PREMIUM_NO
    }
}

fn username_value(user: &SessionUser) -> String {
    match user.username.as_deref() {
        Some(name) if !name.is_empty() => format!("@{name}"),
        _ => ABSENT_PLACEHOLDER.to_string(),
    }
}

fn language_value(user: &SessionUser) -> String {
    match user.language_code.as_deref() {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => "unknown".to_string(),
    }
}

pub fn session_rows(session: Option<&BridgeSession>) -> Vec<(&'static str, String)> {
    match session {
        Some(session) => vec![
            ("Platform", nonempty_or(&session.platform, "unknown")),
            ("Version", nonempty_or(&session.version, "unknown")),
            ("Theme", scheme_label(session.color_scheme).to_string()),
            (
                "Viewport",
                format!(
                    "{:.0} / {:.0} stable",
                    session.viewport_height, session.viewport_stable_height
                ),
            ),
            (
                "Expanded",
                if session.is_expanded { "yes" } else { "no" }.to_string(),
            ),
        ],
        None => vec![("Session", "unavailable".to_string())],
    }
}

fn nonempty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

pub fn scheme_label(scheme: ColorScheme) -> &'static str {
    match scheme {
        ColorScheme::Light => "light",
        ColorScheme::Dark => "dark",
    }
}

pub fn connectivity_label(state: ConnectivityState) -> &'static str {
    match state {
        ConnectivityState::Unknown => "⏳ Checking...",
        ConnectivityState::Online => "✅ Online",
        ConnectivityState::Offline => "❌ Offline",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        connectivity_label, premium_symbol, session_rows, user_panel, UserPanel,
        ABSENT_PLACEHOLDER, PREMIUM_NO, PREMIUM_YES,
    };
    use crate::api::ConnectivityState;
    use crate::bridge::{BridgeSession, ColorScheme, SessionUser};

    fn sample_user() -> SessionUser {
        SessionUser {
            id: 99281,
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            username: Some("adal".to_string()),
            language_code: Some("en".to_string()),
            is_premium: true,
        }
    }

    fn row<'a>(rows: &'a [(&'static str, String)], label: &str) -> &'a str {
        rows.iter()
            .find(|(row_label, _)| *row_label == label)
            .map(|(_, value)| value.as_str())
            .unwrap_or_else(|| panic!("missing row {label}"))
    }

    #[test]
    fn known_user_projects_id_name_and_a_single_premium_symbol() {
        let panel = user_panel(Some(&sample_user()));
        let UserPanel::Known { rows, badge } = panel else {
            panic!("expected a known-user panel");
        };

        assert_eq!(row(&rows, "ID"), "99281");
        assert_eq!(row(&rows, "Name"), "Ada Lovelace");
        assert_eq!(row(&rows, "Username"), "@adal");
        assert_eq!(row(&rows, "Premium"), PREMIUM_YES);
        assert_eq!(badge, "👋 Ada");
    }

    #[test]
    fn premium_symbol_is_exactly_one_of_two_fixed_values() {
        assert_eq!(premium_symbol(true), PREMIUM_YES);
        assert_eq!(premium_symbol(false), PREMIUM_NO);
    }

    #[test]
    fn missing_optionals_render_defined_placeholders() {
        let user = SessionUser {
            username: None,
            language_code: None,
            last_name: None,
            is_premium: false,
            ..sample_user()
        };
        let UserPanel::Known { rows, .. } = user_panel(Some(&user)) else {
            panic!("expected a known-user panel");
        };

        assert_eq!(row(&rows, "Username"), ABSENT_PLACEHOLDER);
        assert_eq!(row(&rows, "Language"), "unknown");
        assert_eq!(row(&rows, "Premium"), PREMIUM_NO);
    }

    #[test]
    fn absent_user_projects_the_fallback_state() {
        match user_panel(None) {
            UserPanel::Unavailable { headline, hint } => {
                assert!(headline.contains("unavailable"));
                assert!(hint.contains("outside the host"));
            }
            UserPanel::Known { .. } => panic!("absent user must not look known"),
        }
    }

    #[test]
    fn session_rows_cover_platform_theme_and_viewport() {
        let session = BridgeSession {
            platform: "tdesktop".to_string(),
            version: "8.0".to_string(),
            color_scheme: ColorScheme::Dark,
            viewport_height: 720.0,
            viewport_stable_height: 700.0,
            init_data: String::new(),
            is_expanded: true,
        };
        let rows = session_rows(Some(&session));

        assert_eq!(row(&rows, "Platform"), "tdesktop");
        assert_eq!(row(&rows, "Theme"), "dark");
        assert_eq!(row(&rows, "Viewport"), "720 / 700 stable");
        assert_eq!(row(&rows, "Expanded"), "yes");
    }

    #[test]
    fn absent_session_projects_a_single_unavailable_row() {
        let rows = session_rows(None);
        assert_eq!(rows, vec![("Session", "unavailable".to_string())]);
    }

    #[test]
    fn connectivity_labels_are_fixed_strings() {
        assert_eq!(connectivity_label(ConnectivityState::Online), "✅ Online");
        assert_eq!(connectivity_label(ConnectivityState::Offline), "❌ Offline");
        assert_eq!(
            connectivity_label(ConnectivityState::Unknown),
            "⏳ Checking..."
        );
    }
}
