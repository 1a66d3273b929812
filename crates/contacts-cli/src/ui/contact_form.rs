//! Create/edit modal.

use contacts_core::{contact::Field, form::ContactForm, store::ContactStore};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};

use super::centered;
use crate::app::App;

const FIELDS: [(Field, &str); 3] = [
  (Field::Name, "Name"),
  (Field::Email, "Email"),
  (Field::Phone, "Phone"),
];

/// Render the form modal over `area`.
pub fn draw<S: ContactStore + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let Some(form) = &app.form else { return };

  let (title, description) = if form.is_editing() {
    (" Edit Contact ", "Update contact information below.")
  } else {
    (" Add New Contact ", "Fill in the details to create a new contact.")
  };

  let modal = centered(area, 60, 15);
  f.render_widget(Clear, modal);

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(modal);
  f.render_widget(block, modal);

  let mut lines = vec![
    Line::from(Span::styled(description, Style::default().fg(Color::DarkGray))),
    Line::from(""),
  ];
  for (field, label) in FIELDS {
    lines.extend(field_lines(form, field, label, app.form_focus == field));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(vec![
    Span::styled(
      format!(" {} ", app.submit_label()),
      Style::default()
        .fg(Color::Black)
        .bg(if app.is_saving() { Color::DarkGray } else { Color::Cyan })
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled("  Enter submit  Esc cancel", Style::default().fg(Color::DarkGray)),
  ]));

  f.render_widget(Paragraph::new(lines), inner);
}

/// Label and value on one line, the field's message (if any) on the next.
fn field_lines(
  form: &ContactForm,
  field: Field,
  label: &str,
  focused: bool,
) -> Vec<Line<'static>> {
  let slot = form.field(field);

  let label_style = if focused {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Cyan)
  };
  let value_style = if slot.is_valid() {
    Style::default()
  } else {
    Style::default().fg(Color::Red)
  };
  let cursor = if focused { "_" } else { "" };

  let mut lines = vec![Line::from(vec![
    Span::styled(format!("{label:<8}"), label_style),
    Span::styled(format!("{}{cursor}", slot.value()), value_style),
  ])];
  match slot.error() {
    Some(message) => lines.push(Line::from(Span::styled(
      format!("        {message}"),
      Style::default().fg(Color::Red),
    ))),
    None => lines.push(Line::from("")),
  }
  lines
}
