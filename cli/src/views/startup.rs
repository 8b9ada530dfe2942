use std::sync::Arc;

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{
  layout::{ Alignment, Constraint, Direction, Layout },
  text::Text,
  widgets::Paragraph,
  Frame,
};

use crate::state::store::Store;
use crate::widgets::{ logo::logo, util };

use super::View;

/// Shown until the first status arrives from the device.
pub struct StartupView {
  store: Arc<Store>,
  url: String,
}

impl StartupView {
  pub fn new(store: Arc<Store>, url: &str) -> Self {
    Self { store, url: url.to_string() }
  }

  fn get_status_message(&self) -> String {
    self.store.with_state(|state| {
      if state.status_message.is_empty() {
        format!("Connecting to {}...", self.url)
      } else {
        format!("{}: {}", self.url, state.status_message)
      }
    })
  }
}

impl View for StartupView {
  fn render(&mut self, frame: &mut Frame) {
    let logo = logo();
    let body = Text::from(self.get_status_message());

    let inner_layout = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(5),
        Constraint::Length(1),
      ]);
    let (logo_area, text_area) = util::vertically_centered_layout(frame.area(), inner_layout);

    let logo_paragraph = Paragraph::new(logo).alignment(Alignment::Center);
    frame.render_widget(logo_paragraph, logo_area);

    let body_paragraph = Paragraph::new(body).alignment(Alignment::Center);
    frame.render_widget(body_paragraph, text_area);
  }

  fn handle_input(&mut self, _key_event: KeyEvent, _store: &Store) -> Result<()> {
    Ok(())
  }
}
