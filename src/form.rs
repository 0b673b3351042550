//! The contact form owned by the application: its fields and its trigger control.

use crate::model::SubmissionRequest;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const DEFAULT_TRIGGER_LABEL: &str = "Send message";
pub const PENDING_TRIGGER_LABEL: &str = "Sending...";

/// The control that starts a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerControl {
    enabled: bool,
    label: String,
}

impl Default for TriggerControl {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_LABEL)
    }
}

impl TriggerControl {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            enabled: true,
            label: label.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Disable and swap the label, returning the label that was replaced.
    pub(crate) fn engage(&mut self, pending_label: &str) -> String {
        self.enabled = false;
        std::mem::replace(&mut self.label, pending_label.to_owned())
    }

    pub(crate) fn release(&mut self, original_label: String) {
        self.enabled = true;
        self.label = original_label;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub privacy_accepted: bool,
    pub trigger: TriggerControl,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trigger_label(label: impl Into<String>) -> Self {
        Self {
            trigger: TriggerControl::new(label),
            ..Self::default()
        }
    }

    /// Snapshot the current field values.
    pub fn capture(&self) -> SubmissionRequest {
        SubmissionRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            message: self.message.clone(),
            privacy_accepted: self.privacy_accepted,
        }
    }

    /// Fill the fields from a request, e.g. when the form comes from CLI flags.
    pub fn fill(&mut self, request: &SubmissionRequest) {
        self.name = request.name.clone();
        self.email = request.email.clone();
        self.phone = request.phone.clone();
        self.message = request.message.clone();
        self.privacy_accepted = request.privacy_accepted;
    }

    /// Clear every field. The trigger control is not a field and is left alone.
    pub fn reset(&mut self) {
        self.name.clear();
        self.email.clear();
        self.phone.clear();
        self.message.clear();
        self.privacy_accepted = false;
    }
}

/// The form as shared between the UI and the submission controller.
pub type SharedForm = Arc<Mutex<ContactForm>>;

pub fn shared(form: ContactForm) -> SharedForm {
    Arc::new(Mutex::new(form))
}

/// Lock the form. Critical sections never span an await or a user callback,
/// so the data behind a poisoned lock is still consistent.
pub fn lock(form: &SharedForm) -> MutexGuard<'_, ContactForm> {
    form.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_fields_but_not_trigger() {
        let mut form = ContactForm::with_trigger_label("Go");
        form.name = "Ana".into();
        form.email = "ana@x.com".into();
        form.privacy_accepted = true;
        form.trigger.engage("...");

        form.reset();
        assert_eq!(form.capture(), SubmissionRequest::default());
        assert!(!form.trigger.is_enabled());
        assert_eq!(form.trigger.label(), "...");
    }

    #[test]
    fn engage_and_release_round_the_label() {
        let mut trigger = TriggerControl::default();
        let original = trigger.engage(PENDING_TRIGGER_LABEL);
        assert_eq!(original, DEFAULT_TRIGGER_LABEL);
        assert!(!trigger.is_enabled());
        assert_eq!(trigger.label(), PENDING_TRIGGER_LABEL);

        trigger.release(original);
        assert!(trigger.is_enabled());
        assert_eq!(trigger.label(), DEFAULT_TRIGGER_LABEL);
    }

    #[test]
    fn fill_then_capture_returns_the_same_request() {
        let request = SubmissionRequest {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            phone: "555".into(),
            message: "hola".into(),
            privacy_accepted: true,
        };
        let mut form = ContactForm::new();
        form.fill(&request);
        assert_eq!(form.capture(), request);
    }
}
