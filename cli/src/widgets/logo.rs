use ratatui::text::{ Line, Text };

const LOGO: [&str; 5] = [
  r"    _              _ _ ____  _ ",
  r"   / \   _ __ ___ | (_)  _ \(_)",
  r"  / _ \ | '_ ` _ \| | | |_) | |",
  r" / ___ \| | | | | | | |  __/| |",
  r"/_/   \_\_| |_| |_|_|_|_|   |_|",
];

pub fn logo() -> Text<'static> {
  Text::from(LOGO.iter().map(|line| Line::raw(*line)).collect::<Vec<_>>())
}
