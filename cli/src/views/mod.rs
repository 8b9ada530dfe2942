pub mod control;
pub mod startup;

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::state::store::Store;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewType {
  Startup,
  Control,
}

pub trait View {
  fn render(&mut self, frame: &mut Frame);
  fn handle_input(&mut self, key_event: KeyEvent, store: &Store) -> Result<()>;
}
