//! Toast overlay drawn over the top-right corner of the screen.

use crate::notify::{Kind, NotificationView, Phase};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const TOAST_WIDTH: u16 = 48;
const MARGIN: u16 = 1;

fn kind_color(kind: Kind) -> Color {
    match kind {
        Kind::Success => Color::Green,
        Kind::Error => Color::Red,
        Kind::Info => Color::Cyan,
    }
}

/// Rows needed to show `text` wrapped at `width`, counting at least one.
fn wrapped_rows(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let chars = text.chars().count();
    chars.div_ceil(width).max(1) as u16
}

/// Stack toasts downward from the top-right corner in display order,
/// dropping whatever no longer fits.
pub fn toast_areas(area: Rect, views: &[NotificationView]) -> Vec<Rect> {
    let width = TOAST_WIDTH.min(area.width.saturating_sub(2 * MARGIN));
    if width < 8 {
        return Vec::new();
    }
    let x = area.x + area.width - width - MARGIN;
    let inner_width = width - 2;
    let bottom = area.y + area.height;

    let mut y = area.y + MARGIN;
    let mut out = Vec::with_capacity(views.len());
    for view in views {
        let height = wrapped_rows(&view.message, inner_width) + 2;
        if y + height > bottom {
            break;
        }
        out.push(Rect::new(x, y, width, height));
        y += height;
    }
    out
}

pub fn draw_toasts(area: Rect, f: &mut Frame, views: &[NotificationView]) {
    for (view, rect) in views.iter().zip(toast_areas(area, views)) {
        let hiding = view.phase == Phase::Hiding;
        let color = if hiding {
            Color::DarkGray
        } else {
            kind_color(view.kind)
        };
        let mut title = vec![Span::styled(
            format!(" {} ", view.kind.icon()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        if let Some(t) = &view.title {
            title.push(Span::styled(
                format!("{t} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }
        let body_style = if hiding {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let p = Paragraph::new(Line::from(view.message.as_str()))
            .style(body_style)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(Line::from(title)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}
