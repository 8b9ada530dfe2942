use std::sync::{ Arc, Mutex, MutexGuard };

use amplipi::{ SourceId, Status };

use crate::views::ViewType;

use super::reducers::{ self, AppAction };

/// One entry in the source tab bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTab {
  pub id: SourceId,
  pub name: String,
}

impl SourceTab {
  /// Tabs for the sources the device reports, or for every source some zone
  /// is routed to when the device lists none.
  pub fn from_status(status: &Status) -> Vec<SourceTab> {
    if !status.sources.is_empty() {
      return status.sources
        .iter()
        .map(|source| SourceTab {
          id: source.id,
          name: if source.name.is_empty() { default_name(source.id) } else { source.name.clone() },
        })
        .collect();
    }

    let mut ids: Vec<SourceId> = status.zones.iter().filter_map(|zone| zone.source_id).collect();
    ids.sort();
    ids.dedup();
    ids.into_iter().map(|id| SourceTab { id, name: default_name(id) }).collect()
  }
}

fn default_name(id: SourceId) -> String {
  format!("Source {}", id.0 + 1)
}

#[derive(Debug)]
pub struct AppState {
  pub view: ViewType,
  pub sources: Vec<SourceTab>,
  pub active_source: usize,
  pub connected: bool,
  pub status_message: String,
  pub exit: bool,
}

impl Default for AppState {
  fn default() -> Self {
    Self {
      view: ViewType::Startup,
      sources: Vec::new(),
      active_source: 0,
      connected: false,
      status_message: String::new(),
      exit: false,
    }
  }
}

impl AppState {
  pub fn active_source_id(&self) -> Option<SourceId> {
    self.sources.get(self.active_source).map(|tab| tab.id)
  }
}

pub struct Store {
  state: Arc<Mutex<AppState>>,
}

impl Store {
  pub fn new() -> Self {
    Self {
      state: Arc::new(Mutex::new(AppState::default())),
    }
  }

  fn lock(&self) -> MutexGuard<'_, AppState> {
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn dispatch(&self, action: AppAction) {
    let mut state = self.lock();
    reducers::app_reducer(&mut state, action);
  }

  pub fn with_state<F, T>(&self, f: F) -> T
  where
    F: FnOnce(&AppState) -> T
  {
    let state = self.lock();
    f(&state)
  }
}

impl Default for Store {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use amplipi::{ Source, Zone };

  #[test]
  fn test_dispatch_updates_state() {
    let store = Store::new();
    store.dispatch(AppAction::SetStatusMessage("hello".to_string()));

    let message = store.with_state(|state| state.status_message.clone());
    assert_eq!(message, "hello");
  }

  #[test]
  fn test_tabs_from_reported_sources() {
    let status = Status {
      sources: vec![
        Source { id: SourceId(0), name: "Turntable".to_string(), input: "local".to_string() },
        Source { id: SourceId(1), name: String::new(), input: String::new() },
      ],
      ..Status::default()
    };

    let names: Vec<String> = SourceTab::from_status(&status).into_iter().map(|tab| tab.name).collect();
    assert_eq!(names, vec!["Turntable", "Source 2"]);
  }

  #[test]
  fn test_tabs_from_zone_routing() {
    let status = Status {
      zones: vec![
        Zone::new(1, 0.5).with_source(2),
        Zone::new(2, 0.5),
        Zone::new(3, 0.5).with_source(0),
        Zone::new(4, 0.5).with_source(2),
      ],
      ..Status::default()
    };

    let ids: Vec<SourceId> = SourceTab::from_status(&status).into_iter().map(|tab| tab.id).collect();
    assert_eq!(ids, vec![SourceId(0), SourceId(2)]);
  }

  #[test]
  fn test_active_source_id_without_sources() {
    let store = Store::new();
    assert_eq!(store.with_state(|state| state.active_source_id()), None);
  }
}
