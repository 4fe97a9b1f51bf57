//! Top header with the server URL and connection status.

use crate::session::ConnStatus;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
};

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, url: &str, status: &ConnStatus) {
    let icon = match status {
        ConnStatus::Connected => "☀️",
        ConnStatus::Connecting | ConnStatus::LoadingHistory => "⏳",
        ConnStatus::Disconnected(_) => "🌑",
    };
    let title = format!("solartop — {url} | {status} {icon}  (press 'q' to quit)");
    f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
}
