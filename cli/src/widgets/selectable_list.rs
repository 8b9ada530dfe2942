use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

#[derive(Clone)]
pub struct SelectableList {
    title: String,
    items: Vec<ListItem<'static>>,
    state: ListState,
}

impl SelectableList {
    pub fn new(title: &str, items: Vec<ListItem<'static>>) -> Self {
        let mut state = ListState::default();
        // Only select first item if list is not empty
        if !items.is_empty() {
            state.select(Some(0));
        }

        Self {
            title: title.to_string(),
            items,
            state,
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let list = List::new(self.items.clone())
            .block(Block::default().borders(Borders::TOP).title(self.title.clone()))
            .highlight_style(Style::new().reversed())
            .highlight_symbol("▸ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        let i = self.state.selected().unwrap_or(0);
        let next = (i + 1) % self.items.len();
        self.state.select(Some(next));
        Some(next)
    }

    pub fn previous(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
        Some(i)
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    /// Move the selection to the first row.
    pub fn reset(&mut self) {
        self.state.select(if self.items.is_empty() { None } else { Some(0) });
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// Replace the rows, keeping the selection on the same index when it is
    /// still in range.
    pub fn update_items(&mut self, items: Vec<ListItem<'static>>) {
        self.items = items;
        let selected = match (self.state.selected(), self.items.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.state.select(selected);
    }
}
