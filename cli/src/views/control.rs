use std::sync::Arc;

use amplipi::{ ControlTarget, Controller, SourceId, SourceView };
use anyhow::Result;
use crossterm::event::{ KeyCode, KeyEvent };
use ratatui::{
  layout::{ Constraint, Direction, Layout },
  style::{ Color, Style, Stylize },
  text::{ Line, Span },
  widgets::{ ListItem, Paragraph, Tabs },
  Frame,
};

use crate::state::reducers::AppAction;
use crate::state::store::Store;
use crate::widgets::selectable_list::SelectableList;
use crate::widgets::volume_gauge::control_line;

use super::View;

const HELP: &str = "Tab source  ↑↓ select  ←→ volume  m mute  q quit";

/// Sliders for the active source: the source itself, each fitted group and
/// every zone no group covers.
pub struct ControlView {
  store: Arc<Store>,
  controller: Arc<Controller>,
  list: SelectableList,
  targets: Vec<ControlTarget>,
  shown_source: Option<SourceId>,
  step: f64,
}

impl ControlView {
  pub fn new(store: Arc<Store>, controller: Arc<Controller>, step: f64) -> Self {
    Self {
      store,
      controller,
      list: SelectableList::new("Zones", vec![]),
      targets: Vec::new(),
      shown_source: None,
      step,
    }
  }

  fn current_view(&self) -> Option<SourceView> {
    let source_id = self.store.with_state(|state| state.active_source_id())?;
    self.controller.source_view(source_id)
  }

  /// Rebuild the rows from the cache. A source switch moves the selection
  /// back to the source's own slider.
  fn refresh(&mut self) {
    let view = self.current_view();
    let rows = view.as_ref().map(control_rows).unwrap_or_default();

    self.targets = rows.iter().map(|(target, _)| *target).collect();
    self.list.update_items(rows.into_iter().map(|(_, line)| ListItem::new(line)).collect());
    if let Some(view) = &view {
      self.list.set_title(&view.name);
    }

    let source_id = view.map(|view| view.source_id);
    if source_id != self.shown_source {
      self.list.reset();
      self.shown_source = source_id;
    }
  }

  pub fn selected_target(&self) -> Option<ControlTarget> {
    self.list.selected().and_then(|i| self.targets.get(i).copied())
  }

  fn adjust_selected(&mut self, delta: f64, store: &Store) {
    let Some(target) = self.selected_target() else { return };
    let Some((vol_f, _)) = self.current_view().and_then(|view| view.level(target)) else { return };
    report(store, self.controller.set_volume(target, vol_f + delta));
  }

  fn toggle_selected_mute(&mut self, store: &Store) {
    if let Some(target) = self.selected_target() {
      report(store, self.controller.toggle_mute(target));
    }
  }

  fn tabs(&self) -> Tabs<'static> {
    self.store.with_state(|state| {
      let titles: Vec<String> = state.sources.iter().map(|tab| tab.name.clone()).collect();
      Tabs::new(titles)
        .select(state.active_source)
        .highlight_style(Style::new().reversed())
    })
  }

  fn status_line(&self) -> Line<'static> {
    self.store.with_state(|state| {
      let indicator = if state.connected {
        Span::styled("● connected", Style::default().fg(Color::Green))
      } else {
        Span::styled("● disconnected", Style::default().fg(Color::Red))
      };
      let message = if state.status_message.is_empty() {
        Span::raw(HELP).dark_gray()
      } else {
        Span::raw(state.status_message.clone()).yellow()
      };
      Line::from(vec![indicator, Span::raw("  "), message])
    })
  }
}

fn control_rows(view: &SourceView) -> Vec<(ControlTarget, Line<'static>)> {
  let mut rows = vec![(
    ControlTarget::Source(view.source_id),
    control_line(&view.name, view.vol_f, view.mute, 0),
  )];
  rows.extend(view.groups.iter().map(|control| {
    (
      ControlTarget::Group(control.group.id),
      control_line(&control.group.name, control.vol_f, control.mute, 2),
    )
  }));
  rows.extend(view.standalone.iter().map(|zone| {
    (
      ControlTarget::Zone(zone.id),
      control_line(&zone.name, zone.vol_f, zone.mute, 2),
    )
  }));
  rows
}

fn report(store: &Store, result: amplipi::Result<()>) {
  match result {
    Ok(()) => store.dispatch(AppAction::ClearStatusMessage),
    Err(e) => {
      log::warn!("control action failed: {}", e);
      store.dispatch(AppAction::SetStatusMessage(e.to_string()));
    }
  }
}

impl View for ControlView {
  fn render(&mut self, frame: &mut Frame) {
    self.refresh();

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
      ])
      .split(frame.area());

    frame.render_widget(self.tabs(), chunks[0]);
    self.list.draw(frame, chunks[1]);
    frame.render_widget(Paragraph::new(self.status_line()), chunks[2]);
  }

  fn handle_input(&mut self, key_event: KeyEvent, store: &Store) -> Result<()> {
    self.refresh();

    match key_event.code {
      KeyCode::Tab => {
        store.dispatch(AppAction::NextSource);
      }
      KeyCode::BackTab => {
        store.dispatch(AppAction::PreviousSource);
      }
      KeyCode::Up => {
        self.list.previous();
      }
      KeyCode::Down => {
        self.list.next();
      }
      KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => {
        self.adjust_selected(self.step, store);
      }
      KeyCode::Left | KeyCode::Char('-') => {
        self.adjust_selected(-self.step, store);
      }
      KeyCode::Char('m') => {
        self.toggle_selected_mute(store);
      }
      _ => {}
    }
    Ok(())
  }
}
