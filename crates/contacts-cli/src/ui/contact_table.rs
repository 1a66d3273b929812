//! Contact table: the main pane.

use contacts_core::store::ContactStore;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::app::App;

/// Render the contact list into `area`.
pub fn draw<S: ContactStore + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let filtered = app.filtered();

  let block = Block::default()
    .title(" Contact List ")
    .title_top(Line::from(format!(" Total: {} ", filtered.len())).right_aligned())
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner = block.inner(area);
  f.render_widget(block, area);

  // Search input on the first inner line.
  if inner.height > 2 {
    let search_area = Rect { height: 1, ..inner };
    inner.y += 2;
    inner.height -= 2;

    let line = if app.filter.is_empty() && !app.filter_active {
      Line::from(Span::styled(
        "/ Search contacts...",
        Style::default().fg(Color::DarkGray),
      ))
    } else {
      let cursor = if app.filter_active { "_" } else { "" };
      Line::from(Span::styled(
        format!("/ {}{cursor}", app.filter),
        Style::default().fg(Color::Yellow),
      ))
    };
    f.render_widget(Paragraph::new(line), search_area);
  }

  if inner.height == 0 {
    return;
  }

  // Empty and loading states.
  let placeholder = if app.is_loading() {
    Some("Loading contacts...".to_owned())
  } else if app.contacts().is_empty() {
    match &app.list.error {
      Some(err) if app.list.data.is_none() => Some(err.user_message()),
      _ => Some("No contacts yet. Add your first contact!".to_owned()),
    }
  } else if filtered.is_empty() {
    Some("No contacts found".to_owned())
  } else {
    None
  };
  if let Some(text) = placeholder {
    let middle = Rect { y: inner.y + inner.height / 2, height: 1, ..inner };
    f.render_widget(
      Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .centered(),
      middle,
    );
    return;
  }

  let header = Row::new(["NAME", "EMAIL", "PHONE"]).style(
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let rows: Vec<Row> = filtered
    .iter()
    .map(|contact| {
      let style = if app.deleting.contains(&contact.id) {
        Style::default()
          .fg(Color::DarkGray)
          .add_modifier(Modifier::CROSSED_OUT)
      } else {
        Style::default()
      };
      Row::new([
        Cell::from(contact.name.clone()),
        Cell::from(contact.email.clone()),
        Cell::from(contact.phone.clone()),
      ])
      .style(style)
    })
    .collect();

  let widths = [
    Constraint::Percentage(30),
    Constraint::Percentage(45),
    Constraint::Percentage(25),
  ];

  // Scrollable table with cursor tracking.
  let mut state = TableState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    Table::new(rows, widths).header(header).row_highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}
