//! Confirmation dialog and toast stack.

use contacts_core::{notify::Severity, store::ContactStore};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::centered;
use crate::app::App;

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 3;

/// The delete confirmation prompt.
pub fn draw_confirm(f: &mut Frame, area: Rect) {
  let modal = centered(area, 50, 7);
  f.render_widget(Clear, modal);

  let block = Block::default()
    .title(" Delete Contact? ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let inner = block.inner(modal);
  f.render_widget(block, modal);

  let lines = vec![
    Line::from(
      "This action cannot be undone. This will permanently delete this contact.",
    ),
    Line::from(""),
    Line::from(vec![
      Span::styled(
        " y Delete ",
        Style::default()
          .fg(Color::White)
          .bg(Color::Red)
          .add_modifier(Modifier::BOLD),
      ),
      Span::styled("  n Cancel", Style::default().fg(Color::DarkGray)),
    ]),
  ];
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

/// Live toasts, stacked down from the top-right corner.
pub fn draw_toasts<S: ContactStore + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let width = TOAST_WIDTH.min(area.width);
  let x = area.x + area.width - width;

  for (i, toast) in app.toasts.visible().iter().enumerate() {
    let y = area.y + 1 + i as u16 * TOAST_HEIGHT;
    if y + TOAST_HEIGHT > area.y + area.height {
      break;
    }
    let rect = Rect { x, y, width, height: TOAST_HEIGHT };
    let color = match toast.severity {
      Severity::Success => Color::Green,
      Severity::Failure => Color::Red,
    };

    f.render_widget(Clear, rect);
    f.render_widget(
      Paragraph::new(toast.message.as_str()).block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(color)),
      ),
      rect,
    );
  }
}
