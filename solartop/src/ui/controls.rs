//! Controls footer: relay target selection and key hints.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::types::{LoadState, Stats, Target};
use crate::ui::util::state_dot;

/// Displayed switch state for a target, as far as the latest sample tells us.
fn target_is_on(s: &Stats, target: Target) -> Option<bool> {
    match target {
        Target::Load => Some(matches!(
            s.controller().load_state,
            LoadState::Normal | LoadState::Override
        )),
        Target::Charging => Some(s.controller().charge_state.is_charging()),
        Target::PhySolar => s.phy().map(|p| p.solar),
        Target::PhyBattery => s.phy().map(|p| p.battery),
        Target::PhyMaster => s.phy().map(|p| p.master),
    }
}

pub fn draw_controls(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    selected: Target,
    latest: Option<&Stats>,
) {
    let mut spans: Vec<Span> = Vec::new();
    for target in Target::ALL {
        let dot = state_dot(latest.and_then(|s| target_is_on(s, target)));
        let label = format!(" {} {} ", target.label(), dot);
        let style = if target == selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        "   o: on  f: off  Tab/←/→: select",
        Style::default().fg(Color::DarkGray),
    ));

    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(p, area);
}
