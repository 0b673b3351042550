use crate::notify::{NotificationEvent, NotificationView};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value payload handed to the mail relay, keyed by the relay template's field names.
pub type TemplateParams = BTreeMap<String, String>;

/// Snapshot of the form taken at the moment the user submits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub privacy_accepted: bool,
}

impl SubmissionRequest {
    /// Map the captured fields onto the relay template's parameter names.
    ///
    /// The consent flag is a local precondition and never leaves the machine.
    pub fn template_params(&self) -> TemplateParams {
        let mut params = TemplateParams::new();
        params.insert("from_name".into(), self.name.clone());
        params.insert("from_email".into(), self.email.clone());
        params.insert("phone".into(), self.phone.clone());
        params.insert("message".into(), self.message.clone());
        params
    }
}

/// How a single submit attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Consent box was not ticked; nothing was sent.
    ConsentRequired,
    /// The relay accepted the message.
    Sent { status: u16, text: String },
    /// The relay failed or timed out. `reason` is for logs and reports only.
    Failed { reason: String },
}

impl SubmitOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SubmitOutcome::Sent { .. })
    }
}

/// Machine-readable summary printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub timestamp_utc: String,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
    pub notifications: Vec<NotificationView>,
}

impl SubmitReport {
    pub fn new(
        request: &SubmissionRequest,
        outcome: SubmitOutcome,
        notifications: Vec<NotificationView>,
    ) -> Self {
        Self {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            name: request.name.clone(),
            email: request.email.clone(),
            outcome,
            notifications,
        }
    }
}

/// Events emitted by the orchestrator and consumed by presentation layers.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Notification(NotificationEvent),
    SubmissionStarted,
    SubmissionFinished(SubmitOutcome),
}
