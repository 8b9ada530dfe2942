use super::store::{ AppState, SourceTab };
use crate::views::ViewType;

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    SetSources(Vec<SourceTab>),
    NextSource,
    PreviousSource,
    SetConnected(bool),
    SetStatusMessage(String),
    ClearStatusMessage,
    Quit,
}

pub fn app_reducer(state: &mut AppState, action: AppAction) {
    match action {
        AppAction::SetSources(sources) => {
            // keep the same source selected if it is still there
            let active_id = state.active_source_id();
            state.active_source = active_id
                .and_then(|id| sources.iter().position(|tab| tab.id == id))
                .unwrap_or(0);
            state.sources = sources;
        }
        AppAction::NextSource => {
            if !state.sources.is_empty() {
                state.active_source = (state.active_source + 1) % state.sources.len();
                log::debug!("NextSource action received, now {}", state.active_source);
            }
        }
        AppAction::PreviousSource => {
            if !state.sources.is_empty() {
                let len = state.sources.len();
                state.active_source = (state.active_source + len - 1) % len;
                log::debug!("PreviousSource action received, now {}", state.active_source);
            }
        }
        AppAction::SetConnected(connected) => {
            if connected && !state.connected {
                log::info!("device connected");
                state.status_message.clear();
            } else if !connected && state.connected {
                log::info!("device disconnected");
            }
            state.connected = connected;
            if connected && state.view == ViewType::Startup {
                log::debug!("first status received, switching to Control view");
                state.view = ViewType::Control;
            }
        }
        AppAction::SetStatusMessage(message) => {
            state.status_message = message;
        }
        AppAction::ClearStatusMessage => {
            state.status_message.clear();
        }
        AppAction::Quit => {
            log::debug!("Quit action received");
            state.exit = true;
        }
    }
}
