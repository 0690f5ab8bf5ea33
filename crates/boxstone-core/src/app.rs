//! Application shell state: device class, connectivity and theme

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::navigation::SectionId;

lazy_static! {
    static ref MOBILE_AGENT_PATTERN: Regex =
        Regex::new(r"(?i)android|webos|iphone|ipad|ipod|blackberry|iemobile|opera mini").unwrap();
}

/// Storage key of an explicitly chosen theme
pub const THEME_STORAGE_KEY: &str = "theme";

/// How long a notification stays on screen
pub const NOTICE_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub is_mobile: bool,
    pub is_tablet: bool,
}

impl DeviceProfile {
    /// Classify a user agent string
    ///
    /// Tablets (iPads and Android devices without "mobile" after "android")
    /// also count as mobile.
    pub fn detect(user_agent: &str) -> Self {
        let agent = user_agent.to_lowercase();
        let is_tablet = agent.contains("ipad")
            || agent
                .find("android")
                .is_some_and(|at| !agent[at..].contains("mobile"));
        Self {
            is_mobile: MOBILE_AGENT_PATTERN.is_match(&agent),
            is_tablet,
        }
    }

    /// Classes added to `<body>`
    pub fn body_classes(&self) -> Vec<&'static str> {
        let mut classes = vec![if self.is_mobile { "is-mobile" } else { "is-desktop" }];
        if self.is_tablet {
            classes.push("is-tablet");
        }
        classes
    }

    pub fn label(&self) -> &'static str {
        if self.is_mobile {
            "Mobile"
        } else if self.is_tablet {
            "Tablet"
        } else {
            "Desktop"
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// A stored choice wins over the system preference
    pub fn resolve(stored: Option<&str>, prefers_dark: bool) -> Self {
        match stored.and_then(Theme::parse) {
            Some(theme) => theme,
            None if prefers_dark => Theme::Dark,
            None => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        }
    }
}

/// Transient toast notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            duration: NOTICE_DURATION,
        }
    }

    pub fn connectivity(online: bool) -> Self {
        if online {
            Notice::new(NoticeKind::Success, "Connection restored")
        } else {
            Notice::new(NoticeKind::Warning, "No internet connection")
        }
    }
}

/// Page-level DOM operations outside the three components
pub trait NoticeView {
    /// Show a toast that removes itself after `notice.duration`
    fn notify(&mut self, notice: &Notice);
    fn set_device_classes(&mut self, classes: &[&str]);
    fn apply_theme(&mut self, theme: Theme);
    fn emit_app_initialized(&mut self, version: &str, timestamp: DateTime<Utc>);
}

/// What the host knows about the browser at startup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default = "default_online")]
    pub online: bool,
    #[serde(default)]
    pub prefers_dark: bool,
    /// Location path of the landing page view
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        Self {
            user_agent: String::new(),
            online: default_online(),
            prefers_dark: false,
            path: default_path(),
        }
    }
}

fn default_online() -> bool {
    true
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub is_initialized: bool,
    pub current_section: SectionId,
    pub device: DeviceProfile,
    pub is_online: bool,
    /// False while the tab is in the background
    pub is_visible: bool,
    pub theme: Theme,
    pub language: String,
}

impl AppState {
    pub fn new(initial_section: SectionId, language: impl Into<String>) -> Self {
        Self {
            is_initialized: false,
            current_section: initial_section,
            device: DeviceProfile::default(),
            is_online: true,
            is_visible: true,
            theme: Theme::default(),
            language: language.into(),
        }
    }
}
