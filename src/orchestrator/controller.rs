//! Submission lifecycle controller.
//!
//! Owns the in-flight submission task and routes UI commands; emits events for
//! presentation layers.

use crate::config::RelayConfig;
use crate::form::{self, ContactForm};
use crate::model::{AppEvent, SubmitOutcome};
use crate::notify::{NotificationEvent, NotificationManager};
use crate::relay::MailRelay;
use crate::submission::{self, SubmissionController};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Commands emitted by UI layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiCommand {
    Submit,
    DismissNewest,
    Quit,
}

/// Handles to a running controller loop.
pub(crate) struct Session<R> {
    pub controller: Arc<SubmissionController<R>>,
    pub events: UnboundedReceiver<AppEvent>,
    pub commands: UnboundedSender<UiCommand>,
    pub handle: JoinHandle<Result<()>>,
}

/// Wire form, notification manager and relay together and spawn the controller loop.
pub(crate) fn start_session<R: MailRelay>(
    cfg: RelayConfig,
    relay: Arc<R>,
    form: ContactForm,
) -> Session<R> {
    let (notif_tx, notif_rx) = tokio::sync::mpsc::unbounded_channel::<NotificationEvent>();
    let (event_tx, events) = tokio::sync::mpsc::unbounded_channel::<AppEvent>();
    let (commands, cmd_rx) = tokio::sync::mpsc::unbounded_channel::<UiCommand>();

    let notifier = NotificationManager::with_events(notif_tx);
    notifier.initialize();
    let controller = Arc::new(
        SubmissionController::new(form::shared(form), notifier, relay, cfg)
            .with_events(event_tx.clone()),
    );
    let handle = tokio::spawn(run_controller(
        controller.clone(),
        notif_rx,
        event_tx,
        cmd_rx,
    ));
    Session {
        controller,
        events,
        commands,
        handle,
    }
}

/// Route UI commands to the submission controller and notification manager,
/// and forward everything they report to `event_tx`.
pub(crate) async fn run_controller<R: MailRelay>(
    controller: Arc<SubmissionController<R>>,
    mut notif_rx: UnboundedReceiver<NotificationEvent>,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut in_flight: Option<JoinHandle<SubmitOutcome>> = None;
    let mut quit_pending = false;

    let res = loop {
        tokio::select! {
            biased;

            Some(ev) = notif_rx.recv() => {
                let _ = event_tx.send(AppEvent::Notification(ev));
            }
            cmd = cmd_rx.recv(), if !quit_pending => {
                match cmd {
                    Some(UiCommand::Submit) => {
                        // The disabled trigger is the only gate against a second submit.
                        let trigger_enabled = form::lock(controller.form()).trigger.is_enabled();
                        if in_flight.is_some() || !trigger_enabled {
                            log::debug!("submit ignored: a submission is already in flight");
                        } else {
                            let ctrl = controller.clone();
                            in_flight = Some(tokio::spawn(async move { ctrl.submit().await }));
                        }
                    }
                    Some(UiCommand::DismissNewest) => {
                        controller.notifier().dismiss_newest();
                    }
                    Some(UiCommand::Quit) | None => {
                        match &in_flight {
                            // Cancelling drops the submission future, which restores the trigger.
                            Some(handle) => {
                                quit_pending = true;
                                handle.abort();
                            }
                            None => break Ok(()),
                        }
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it can be dropped
            // if another select branch is chosen, and we'll never observe completion.
            maybe_done = async {
                if let Some(h) = in_flight.as_mut() {
                    return Some(h.await);
                }
                futures::future::pending().await
            } => {
                if let Some(join_res) = maybe_done {
                    in_flight = None;
                    let outcome = match join_res {
                        Ok(outcome) => Some(outcome),
                        Err(e) if e.is_cancelled() => {
                            log::info!("submission cancelled");
                            None
                        }
                        Err(e) => {
                            log::error!("submission task failed: {e}");
                            controller
                                .notifier()
                                .notify(submission::delivery_failed(controller.fallback_contact()));
                            Some(SubmitOutcome::Failed {
                                reason: format!("submission task failed: {e}"),
                            })
                        }
                    };
                    // Notifications raised by the submission precede its outcome.
                    while let Ok(ev) = notif_rx.try_recv() {
                        let _ = event_tx.send(AppEvent::Notification(ev));
                    }
                    if let Some(outcome) = outcome {
                        let _ = event_tx.send(AppEvent::SubmissionFinished(outcome));
                    }
                    if quit_pending {
                        break Ok(());
                    }
                }
            }
        }
    };

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubmissionRequest;
    use crate::notify::{Kind, Notification};
    use crate::relay::testing::{Script, ScriptedRelay};
    use std::time::Duration;

    struct Harness {
        controller: Arc<SubmissionController<ScriptedRelay>>,
        relay: ScriptedRelay,
        cmd_tx: UnboundedSender<UiCommand>,
        event_rx: UnboundedReceiver<AppEvent>,
        task: JoinHandle<Result<()>>,
    }

    fn start(script: Script) -> Harness {
        let mut form = ContactForm::new();
        form.fill(&SubmissionRequest {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            phone: "555".into(),
            message: "hola".into(),
            privacy_accepted: true,
        });
        let relay = ScriptedRelay::new(script);
        let cfg = RelayConfig {
            service_id: "s".into(),
            template_id: "t".into(),
            public_key: "k".into(),
            timeout: None,
            ..RelayConfig::default()
        };
        let session = start_session(cfg, Arc::new(relay.clone()), form);
        Harness {
            controller: session.controller,
            relay,
            cmd_tx: session.commands,
            event_rx: session.events,
            task: session.handle,
        }
    }

    fn drain(rx: &mut UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn finished(events: &[AppEvent]) -> Vec<SubmitOutcome> {
        events
            .iter()
            .filter_map(|e| match e {
                AppEvent::SubmissionFinished(o) => Some(o.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_while_pending_is_ignored() {
        let mut h = start(Script::ResolveAfter(Duration::from_secs(1)));

        h.cmd_tx.send(UiCommand::Submit).unwrap();
        h.cmd_tx.send(UiCommand::Submit).unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(h.relay.calls().len(), 1);
        let events = drain(&mut h.event_rx);
        let outcomes = finished(&events);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_sent());

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn outcome_follows_its_notification() {
        let mut h = start(Script::Reject);

        h.cmd_tx.send(UiCommand::Submit).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let events = drain(&mut h.event_rx);
        let shown = events
            .iter()
            .position(|e| matches!(e, AppEvent::Notification(NotificationEvent::Shown(v)) if v.kind == Kind::Error));
        let done = events
            .iter()
            .position(|e| matches!(e, AppEvent::SubmissionFinished(_)));
        assert!(shown.is_some() && done.is_some());
        assert!(shown < done);

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn quit_cancels_pending_submission_and_restores_trigger() {
        let h = start(Script::Hang);

        h.cmd_tx.send(UiCommand::Submit).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!form::lock(h.controller.form()).trigger.is_enabled());

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.task.await.unwrap().unwrap();
        assert!(form::lock(h.controller.form()).trigger.is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn panicked_submission_surfaces_an_error_toast() {
        let mut h = start(Script::Panic);

        h.cmd_tx.send(UiCommand::Submit).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let outcomes = finished(&drain(&mut h.event_rx));
        assert!(matches!(outcomes.as_slice(), [SubmitOutcome::Failed { .. }]));
        let views = h.controller.notifier().visible();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].kind, Kind::Error);
        assert!(form::lock(h.controller.form()).trigger.is_enabled());

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_commands_reach_the_manager() {
        let h = start(Script::Resolve);
        let notifier = h.controller.notifier().clone();
        notifier.notify(Notification::info("one"));
        notifier.notify(Notification::info("two"));

        h.cmd_tx.send(UiCommand::DismissNewest).unwrap();
        h.cmd_tx.send(UiCommand::DismissNewest).unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(notifier.is_empty());

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn submit_without_consent_never_reports_started() {
        let mut h = start(Script::Resolve);
        form::lock(h.controller.form()).privacy_accepted = false;

        h.cmd_tx.send(UiCommand::Submit).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let events = drain(&mut h.event_rx);
        assert!(!events
            .iter()
            .any(|e| matches!(e, AppEvent::SubmissionStarted)));
        assert_eq!(finished(&events), [SubmitOutcome::ConsentRequired]);
        assert!(h.relay.calls().is_empty());

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.task.await.unwrap().unwrap();
    }
}
