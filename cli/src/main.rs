mod config;
mod state;
mod views;
mod widgets;

use std::fs::{self, File};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use amplipi::{
    ApiClient, Controller, DeviceApi, PollEvent, Poller, SendEvent, StateCache, VolumeSender,
};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{DefaultTerminal, Frame};
use simplelog::WriteLogger;

use config::Config;
use state::reducers::AppAction;
use state::store::{SourceTab, Store};
use views::{control::ControlView, startup::StartupView, View, ViewType};

const INPUT_POLL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config)?;
    log::info!("starting amplipi-tui against {}", config.api.url);

    let api: Arc<dyn DeviceApi> = Arc::new(ApiClient::new(&config.api.url, config.api.timeout())?);
    let cache = StateCache::new();

    let (poll_sender, poll_events) = mpsc::channel();
    let mut poller = Poller::start(
        Arc::clone(&api),
        cache.clone(),
        config.poll.interval(),
        poll_sender,
    );
    let (sender, send_events) = VolumeSender::start(Arc::clone(&api), config.volume.stale_after());
    let controller = Arc::new(Controller::new(api, cache, sender));

    let mut app = App::new(&config, controller, poll_events, send_events);

    let mut terminal = ratatui::init();
    let app_result = app.run(&mut terminal);
    ratatui::restore();

    poller.stop();
    log::info!("amplipi-tui stopped");
    app_result
}

fn init_logging(config: &Config) -> Result<()> {
    let log_path = config::log_file()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("Failed to create data directory")?;
    }
    let file = File::create(&log_path).context("Failed to create log file")?;

    WriteLogger::init(config.log.level_filter(), simplelog::Config::default(), file)
        .context("Failed to initialise logger")?;
    Ok(())
}

pub struct App {
    store: Arc<Store>,
    controller: Arc<Controller>,
    startup: StartupView,
    control: ControlView,
    poll_events: Receiver<PollEvent>,
    send_events: Receiver<SendEvent>,
}

impl App {
    fn new(
        config: &Config,
        controller: Arc<Controller>,
        poll_events: Receiver<PollEvent>,
        send_events: Receiver<SendEvent>,
    ) -> Self {
        let store = Arc::new(Store::new());
        Self {
            startup: StartupView::new(store.clone(), &config.api.url),
            control: ControlView::new(store.clone(), controller.clone(), config.volume.step),
            store,
            controller,
            poll_events,
            send_events,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.store.with_state(|state| state.exit) {
            self.drain_background_events();
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn drain_background_events(&mut self) {
        while let Ok(event) = self.poll_events.try_recv() {
            match event {
                PollEvent::Updated | PollEvent::Discarded => {
                    self.store.dispatch(AppAction::SetConnected(true));
                }
                PollEvent::Disconnected(error) => {
                    self.store.dispatch(AppAction::SetConnected(false));
                    self.store.dispatch(AppAction::SetStatusMessage(error));
                }
            }
        }

        while let Ok(event) = self.send_events.try_recv() {
            if let SendEvent::Failed { zones, error } = event {
                log::warn!("volume change for {:?} failed: {}", zones, error);
                self.store
                    .dispatch(AppAction::SetStatusMessage(format!("Volume change failed: {}", error)));
            }
        }

        if let Some(status) = self.controller.cache().status() {
            self.store
                .dispatch(AppAction::SetSources(SourceTab::from_status(&status)));
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.store.with_state(|state| state.view) {
            ViewType::Startup => self.startup.render(frame),
            ViewType::Control => self.control.render(frame),
        }
    }

    fn handle_events(&mut self) -> Result<()> {
        if !event::poll(INPUT_POLL)? {
            return Ok(());
        }
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind != KeyEventKind::Press || self.handle_shared_event(key_event) {
                return Ok(());
            }

            let store = self.store.clone();
            match store.with_state(|state| state.view) {
                ViewType::Startup => self.startup.handle_input(key_event, &store)?,
                ViewType::Control => self.control.handle_input(key_event, &store)?,
            }
        }
        Ok(())
    }

    fn handle_shared_event(&mut self, key_event: KeyEvent) -> bool {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.store.dispatch(AppAction::Quit);
                true
            }
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.store.dispatch(AppAction::Quit);
                true
            }
            _ => false,
        }
    }
}
