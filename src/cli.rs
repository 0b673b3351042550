use crate::config::{self, RelayConfig};
use crate::form::ContactForm;
use crate::model::{AppEvent, SubmissionRequest, SubmitOutcome, SubmitReport};
use crate::notify::NotificationEvent;
use crate::orchestrator::{self, UiCommand};
use crate::relay::{EmailJsClient, MailRelay};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "contact-relay",
    version,
    about = "Contact form with toast notifications, delivered through an EmailJS-compatible relay"
)]
pub struct Cli {
    /// Path to the JSON config file (defaults to the user config dir)
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Save the effective relay configuration to the config file and exit
    #[arg(long)]
    pub write_config: bool,

    /// Base URL of the mail relay API
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Relay service identifier
    #[arg(long)]
    pub service_id: Option<String>,

    /// Relay template identifier
    #[arg(long)]
    pub template_id: Option<String>,

    /// Relay public key
    #[arg(long)]
    pub public_key: Option<String>,

    /// Relay private access token
    #[arg(long)]
    pub access_token: Option<String>,

    /// Address shown to the user when delivery fails
    #[arg(long)]
    pub fallback_contact: Option<String>,

    /// Give up on the relay after this long (0s waits forever)
    #[arg(long)]
    pub relay_timeout: Option<humantime::Duration>,

    /// Submit once from the form flags and print the outcome as JSON (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Submit once from the form flags and print notifications as text (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Sender name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Sender email address
    #[arg(long, default_value = "")]
    pub email: String,

    /// Sender phone number
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Message body
    #[arg(long, default_value = "")]
    pub message: String,

    /// Accept the privacy policy (required for delivery)
    #[arg(long)]
    pub accept_privacy: bool,

    /// Log level: off, error, warn, info, debug, trace (TUI defaults to off)
    #[arg(long)]
    pub log_level: Option<log::LevelFilter>,
}

impl Cli {
    pub fn is_tui(&self) -> bool {
        !self.json && !self.text
    }

    pub fn effective_log_level(&self) -> log::LevelFilter {
        match self.log_level {
            Some(level) => level,
            // stderr output would corrupt the alternate screen
            None if self.is_tui() && cfg!(feature = "tui") => log::LevelFilter::Off,
            None => log::LevelFilter::Warn,
        }
    }

    fn request(&self) -> SubmissionRequest {
        SubmissionRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            message: self.message.clone(),
            privacy_accepted: self.accept_privacy,
        }
    }

    /// Form pre-filled from the flags.
    pub fn form(&self) -> ContactForm {
        let mut form = ContactForm::new();
        form.fill(&self.request());
        form
    }
}

/// Returns whether the run ended well: `true` unless a non-interactive
/// submission was not delivered.
pub async fn run(args: Cli) -> Result<bool> {
    let file_cfg = config::load(args.config.as_deref()).context("failed to load config")?;
    let cfg = build_config(&args, file_cfg);

    if args.write_config {
        let path = config::save(args.config.as_deref(), &cfg)?;
        eprintln!("Saved: {}", path.display());
        return Ok(true);
    }

    cfg.validate()?;
    let relay = Arc::new(EmailJsClient::new(&cfg)?);

    if args.is_tui() {
        #[cfg(feature = "tui")]
        {
            crate::tui::run(args, cfg, relay).await?;
            return Ok(true);
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_text(args, cfg, relay).await;
        }
    }

    if args.json {
        return run_json(args, cfg, relay).await;
    }

    run_text(args, cfg, relay).await
}

/// Layer CLI overrides on top of the file config.
pub fn build_config(args: &Cli, file_cfg: RelayConfig) -> RelayConfig {
    let mut cfg = file_cfg;
    if let Some(v) = &args.endpoint {
        cfg.endpoint = v.clone();
    }
    if let Some(v) = &args.service_id {
        cfg.service_id = v.clone();
    }
    if let Some(v) = &args.template_id {
        cfg.template_id = v.clone();
    }
    if let Some(v) = &args.public_key {
        cfg.public_key = v.clone();
    }
    if let Some(v) = &args.access_token {
        cfg.access_token = Some(v.clone());
    }
    if let Some(v) = &args.fallback_contact {
        cfg.fallback_contact = v.clone();
    }
    if let Some(v) = args.relay_timeout {
        let d = Duration::from(v);
        cfg.timeout = if d.is_zero() { None } else { Some(d) };
    }
    cfg
}

/// Submit once and return the outcome plus every notification shown along the way.
///
/// With `wait_for_toasts` the session stays open until every notification has
/// left the display region, so the toasts live out their full duration.
async fn submit_once<R: MailRelay>(
    args: &Cli,
    cfg: RelayConfig,
    relay: Arc<R>,
    out_tx: Option<&mpsc::UnboundedSender<OutputLine>>,
    wait_for_toasts: bool,
) -> Result<(SubmitOutcome, Vec<crate::notify::NotificationView>)> {
    let mut session = orchestrator::start_session(cfg, relay, args.form());
    let notifier = session.controller.notifier().clone();
    let _ = session.commands.send(UiCommand::Submit);

    let mut outcome = None;
    let mut shown = Vec::new();
    // The controller keeps a sender alive, so the loop ends on `Quit` rather
    // than on channel close.
    while let Some(ev) = session.events.recv().await {
        let done = match ev {
            AppEvent::Notification(NotificationEvent::Shown(view)) => {
                if let Some(tx) = out_tx {
                    let _ = tx.send(OutputLine::Stderr(view.to_line()));
                }
                shown.push(view);
                false
            }
            AppEvent::Notification(NotificationEvent::Removed { .. }) => {
                outcome.is_some() && notifier.is_empty()
            }
            AppEvent::Notification(NotificationEvent::Hiding { .. }) => false,
            AppEvent::SubmissionStarted => {
                if let Some(tx) = out_tx {
                    let _ = tx.send(OutputLine::Stderr("Sending…".into()));
                }
                false
            }
            AppEvent::SubmissionFinished(o) => {
                outcome = Some(o);
                let done = !wait_for_toasts || notifier.is_empty();
                if !done {
                    log::debug!("waiting for {} notification(s) to expire", notifier.len());
                }
                done
            }
        };
        if done {
            let _ = session.commands.send(UiCommand::Quit);
            break;
        }
    }

    session
        .handle
        .await
        .context("controller task failed")??;
    let outcome = outcome.context("controller stopped before the submission finished")?;
    Ok((outcome, shown))
}

async fn run_text<R: MailRelay>(args: Cli, cfg: RelayConfig, relay: Arc<R>) -> Result<bool> {
    let (out_tx, out_handle) = spawn_output_writer();
    let res = submit_once(&args, cfg, relay, Some(&out_tx), true).await;
    if let Ok((SubmitOutcome::Failed { reason }, _)) = &res {
        let _ = out_tx.send(OutputLine::Stderr(format!("Delivery failed: {reason}")));
    }
    drop(out_tx);
    let _ = out_handle.await;
    let (outcome, _) = res?;
    Ok(outcome.is_sent())
}

async fn run_json<R: MailRelay>(args: Cli, cfg: RelayConfig, relay: Arc<R>) -> Result<bool> {
    let (outcome, shown) = submit_once(&args, cfg, relay, None, false).await?;
    let sent = outcome.is_sent();
    let report = SubmitReport::new(&args.request(), outcome, shown);

    let (out_tx, out_handle) = spawn_output_writer();
    let out = serde_json::to_string_pretty(&report)?;
    let _ = out_tx.send(OutputLine::Stdout(out));
    drop(out_tx);
    let _ = out_handle.await;
    Ok(sent)
}
