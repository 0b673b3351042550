use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(format!("{:pad$}{action}", "")),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        key_line("Esc / Ctrl-C", 3, "Quit"),
        key_line("Tab / ↓", 8, "Next field"),
        key_line("Shift-Tab / ↑", 2, "Previous field"),
        key_line("Space", 10, "Toggle privacy consent (on the checkbox)"),
        key_line("Enter", 10, "Send (on the button) or move to the next field"),
        key_line("Ctrl-S", 9, "Send from any field"),
        key_line("Ctrl-D", 9, "Dismiss the newest notification"),
        key_line("F1", 13, "Toggle this help"),
        Line::from(""),
        Line::from("Notifications close on their own after a few seconds."),
        Line::from("While a message is being sent the button is disabled."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
