//! Notification values and their lifecycle phases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default on-screen time before a notification starts hiding.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

/// Window between entering `Hiding` and being detached from the region.
pub const HIDE_TRANSITION: Duration = Duration::from_millis(300);

/// Identifier handed out by the manager, unique for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub(crate) u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    #[default]
    Success,
    Error,
    Info,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Success => "success",
            Kind::Error => "error",
            Kind::Info => "info",
        }
    }

    /// Glyph rendered next to the message.
    pub fn icon(self) -> &'static str {
        match self {
            Kind::Success => "✓",
            Kind::Error => "✕",
            Kind::Info => "ℹ",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a notification. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Showing,
    Hiding,
    Removed,
}

/// Why a notification started hiding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HideReason {
    Expired,
    Dismissed,
}

/// A notification request. Built with the kind constructors and refined with `with_*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    message: String,
    title: Option<String>,
    kind: Kind,
    duration: Duration,
}

impl Notification {
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            title: None,
            kind,
            duration: DEFAULT_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Kind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Kind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Kind::Info, message)
    }

    /// Set the title. An empty title means "no title".
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = if title.is_empty() { None } else { Some(title) };
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// Read-only snapshot of a notification held by the display region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: NotificationId,
    pub kind: Kind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
    pub phase: Phase,
}

impl NotificationView {
    /// Single-line rendering used by the text output mode.
    pub fn to_line(&self) -> String {
        match &self.title {
            Some(title) => format!("{} [{}] {}: {}", self.kind.icon(), self.kind, title, self.message),
            None => format!("{} [{}] {}", self.kind.icon(), self.kind, self.message),
        }
    }
}
