mod help;
mod state;
mod toasts;

use crate::cli::Cli;
use crate::config::RelayConfig;
use crate::form::{self, ContactForm};
use crate::model::AppEvent;
use crate::orchestrator::{self, UiCommand};
use crate::relay::MailRelay;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use state::{Field, UiState};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc::UnboundedSender;

/// What a key press asks the loop to do.
#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    None,
    Command(UiCommand),
    Quit,
}

pub async fn run<R: MailRelay>(args: Cli, cfg: RelayConfig, relay: Arc<R>) -> Result<()> {
    let mut session = orchestrator::start_session(cfg, relay, args.form());
    let form = session.controller.form().clone();
    let notifier = session.controller.notifier().clone();

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI loop only; the form is shared with the controller.
    let mut state = UiState::default();

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    let res: Result<()> = loop {
        // Drain events without blocking to keep UI responsive; unbounded channel avoids backpressure.
        while let Ok(ev) = session.events.try_recv() {
            apply_event(&mut state, &ev);
        }

        if last_tick.elapsed() >= tick_rate {
            let snapshot = form::lock(&form).clone();
            let views = notifier.visible();
            terminal
                .draw(|f| {
                    draw(f.area(), f, &state, &snapshot);
                    toasts::draw_toasts(f.area(), f, &views);
                })
                .ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                let action = {
                    let mut guard = form::lock(&form);
                    handle_key(&mut state, &mut guard, k)
                };
                match action {
                    KeyAction::None => {}
                    KeyAction::Command(cmd) => send(&session.commands, cmd),
                    KeyAction::Quit => break Ok(()),
                }
            }
        }

        // Let the controller and notification timers make progress.
        tokio::task::yield_now().await;
    };

    send(&session.commands, UiCommand::Quit);
    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();

    session
        .handle
        .await
        .context("controller task failed")??;
    res
}

fn send(tx: &UnboundedSender<UiCommand>, cmd: UiCommand) {
    let _ = tx.send(cmd);
}

fn apply_event(state: &mut UiState, ev: &AppEvent) {
    match ev {
        AppEvent::SubmissionStarted => state.info = "Sending…".into(),
        AppEvent::SubmissionFinished(outcome) => state.record_outcome(outcome),
        // Toasts are drawn from the manager's snapshot each frame.
        AppEvent::Notification(_) => {}
    }
}

fn submit(form: &ContactForm) -> KeyAction {
    // The disabled trigger is unreachable, exactly like a disabled button.
    if form.trigger.is_enabled() {
        KeyAction::Command(UiCommand::Submit)
    } else {
        KeyAction::None
    }
}

fn handle_key(state: &mut UiState, form: &mut ContactForm, k: KeyEvent) -> KeyAction {
    match (k.modifiers, k.code) {
        (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => KeyAction::Quit,
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => submit(form),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => KeyAction::Command(UiCommand::DismissNewest),
        (_, KeyCode::F(1)) => {
            state.show_help = !state.show_help;
            KeyAction::None
        }
        (_, KeyCode::Tab) | (_, KeyCode::Down) => {
            state.focus = state.focus.next();
            KeyAction::None
        }
        (_, KeyCode::BackTab) | (_, KeyCode::Up) => {
            state.focus = state.focus.prev();
            KeyAction::None
        }
        (_, KeyCode::Enter) => match state.focus {
            Field::Submit => submit(form),
            Field::Privacy => {
                form.privacy_accepted = !form.privacy_accepted;
                KeyAction::None
            }
            _ => {
                state.focus = state.focus.next();
                KeyAction::None
            }
        },
        (_, KeyCode::Char(' ')) if state.focus == Field::Privacy => {
            form.privacy_accepted = !form.privacy_accepted;
            KeyAction::None
        }
        (_, KeyCode::Backspace) => {
            if let Some(buf) = state.focus.buffer(form) {
                buf.pop();
            }
            KeyAction::None
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => {
            if let Some(buf) = state.focus.buffer(form) {
                buf.push(c);
            }
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, form: &ContactForm) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled("Contact us", Style::default().fg(Color::Yellow)),
        Span::raw("  F1 help · Esc quit"),
    ]))
    .block(Block::default().borders(Borders::ALL).title("contact-relay"));
    f.render_widget(header, chunks[0]);

    if state.show_help {
        help::draw_help(chunks[1], f);
    } else {
        draw_form(chunks[1], f, state, form);
    }

    let status = Paragraph::new(state.info.as_str())
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[2]);
}

fn draw_form(area: Rect, f: &mut ratatui::Frame, state: &UiState, form: &ContactForm) {
    let focused = |field: Field| {
        if state.focus == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let cursor = |field: Field| {
        if state.focus == field && field.is_text() {
            "▏"
        } else {
            ""
        }
    };

    let mut lines = Vec::new();
    for (field, value) in [
        (Field::Name, &form.name),
        (Field::Email, &form.email),
        (Field::Phone, &form.phone),
        (Field::Message, &form.message),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<9}", field.label()), focused(field)),
            Span::raw(value.as_str()),
            Span::styled(cursor(field), Style::default().fg(Color::Cyan)),
        ]));
        lines.push(Line::from(""));
    }

    let check = if form.privacy_accepted { "[x]" } else { "[ ]" };
    lines.push(Line::from(vec![
        Span::styled(format!("{check} "), focused(Field::Privacy)),
        Span::raw("I accept the privacy policy"),
    ]));
    lines.push(Line::from(""));

    let button_style = if form.trigger.is_enabled() {
        focused(Field::Submit)
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    };
    lines.push(Line::from(Span::styled(
        format!("[ {} ]", form.trigger.label()),
        button_style,
    )));

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Form"));
    f.render_widget(p, area);
}
