//! Submit lifecycle for one contact form.
//!
//! capture -> consent check -> disable trigger -> relay call -> notify ->
//! reset (success only) -> restore trigger. The restore step lives in
//! [`TriggerGuard`]'s `Drop`, so it also runs on panic and when the
//! submission task is cancelled.

use super::messages;
use crate::config::RelayConfig;
use crate::form::{self, SharedForm, PENDING_TRIGGER_LABEL};
use crate::model::{AppEvent, SubmitOutcome, TemplateParams};
use crate::notify::NotificationManager;
use crate::relay::{MailRelay, RelayError, RelayResponse};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub struct SubmissionController<R> {
    form: SharedForm,
    notifier: NotificationManager,
    relay: Arc<R>,
    cfg: RelayConfig,
    events: Option<UnboundedSender<AppEvent>>,
}

impl<R: MailRelay> SubmissionController<R> {
    pub fn new(
        form: SharedForm,
        notifier: NotificationManager,
        relay: Arc<R>,
        cfg: RelayConfig,
    ) -> Self {
        Self {
            form,
            notifier,
            relay,
            cfg,
            events: None,
        }
    }

    /// Report `SubmissionStarted` on `tx` once a message is actually dispatched.
    #[must_use]
    pub fn with_events(mut self, tx: UnboundedSender<AppEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn form(&self) -> &SharedForm {
        &self.form
    }

    pub fn notifier(&self) -> &NotificationManager {
        &self.notifier
    }

    pub fn fallback_contact(&self) -> &str {
        &self.cfg.fallback_contact
    }

    /// Handle one submit of the form.
    pub async fn submit(&self) -> SubmitOutcome {
        let request = form::lock(&self.form).capture();

        if !request.privacy_accepted {
            log::info!("submission blocked: privacy policy not accepted");
            self.notifier.notify(messages::consent_required());
            return SubmitOutcome::ConsentRequired;
        }

        let _trigger = TriggerGuard::engage(&self.form);
        log::info!("submitting contact form from {}", request.email);
        if let Some(tx) = &self.events {
            let _ = tx.send(AppEvent::SubmissionStarted);
        }

        match self.dispatch(&request.template_params()).await {
            Ok(resp) => {
                log::info!("message delivered: {} {}", resp.status, resp.text);
                self.notifier.notify(messages::delivered(&request));
                form::lock(&self.form).reset();
                SubmitOutcome::Sent {
                    status: resp.status,
                    text: resp.text,
                }
            }
            Err(e) => {
                let e = anyhow::Error::new(e);
                log::error!("message delivery failed: {e:#}");
                self.notifier
                    .notify(messages::delivery_failed(&self.cfg.fallback_contact));
                SubmitOutcome::Failed {
                    reason: format!("{e:#}"),
                }
            }
        }
    }

    async fn dispatch(&self, params: &TemplateParams) -> Result<RelayResponse, RelayError> {
        let send = self
            .relay
            .send(&self.cfg.service_id, &self.cfg.template_id, params);
        match self.cfg.timeout {
            Some(limit) if !limit.is_zero() => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| RelayError::TimedOut(limit))?,
            _ => send.await,
        }
    }
}

/// Holds the trigger disabled with the pending label until dropped.
struct TriggerGuard<'a> {
    form: &'a SharedForm,
    original_label: Option<String>,
}

impl<'a> TriggerGuard<'a> {
    fn engage(form: &'a SharedForm) -> Self {
        let original = form::lock(form).trigger.engage(PENDING_TRIGGER_LABEL);
        Self {
            form,
            original_label: Some(original),
        }
    }
}

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        if let Some(label) = self.original_label.take() {
            form::lock(self.form).trigger.release(label);
        }
    }
}
