//! Live readout panel: the latest sample as numbers rather than curves.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::types::Stats;
use crate::ui::util::{amp_hours, amps, kilowatt_hours, state_dot, volts, watts};

pub fn draw_readout(f: &mut ratatui::Frame<'_>, area: Rect, latest: Option<&Stats>) {
    let block = Block::default().borders(Borders::ALL).title("Now");
    let Some(s) = latest else {
        f.render_widget(
            Paragraph::new("waiting for first sample...").block(block),
            area,
        );
        return;
    };

    let c = s.controller();
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let charge_fg = if c.charge_state.is_charging() {
        Color::Green
    } else {
        Color::DarkGray
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!("{:<9}", "Battery")),
            Span::styled(format!("{:>10}", volts(c.battery_terminal_voltage)), bold),
        ]),
        Line::from(vec![
            Span::raw(format!("{:<9}", "Charge")),
            Span::styled(format!("{:>10}", amps(c.charge_current)), bold),
            Span::raw("  "),
            Span::styled(c.charge_state.label(), Style::default().fg(charge_fg)),
        ]),
        Line::from(vec![
            Span::raw(format!("{:<9}", "Array")),
            Span::styled(format!("{:>10}", watts(c.array_power)), bold),
        ]),
        Line::from(vec![
            Span::raw(format!("{:<9}", "Charged")),
            Span::styled(format!("{:>10}", amp_hours(c.ah_charge())), bold),
            Span::raw("  "),
            Span::raw(kilowatt_hours(c.kwh_charge())),
        ]),
        Line::from(vec![
            Span::raw(format!("{:<9}", "Load")),
            Span::raw(format!("{:>10}", c.load_state.label())),
        ]),
    ];

    // Relay line only exists for controllers that report their phy switches
    if let Some(phy) = s.phy() {
        lines.push(Line::from(vec![
            Span::raw(format!("{:<9}", "Relays")),
            Span::raw(format!(
                "solar {}  battery {}  master {}",
                state_dot(Some(phy.solar)),
                state_dot(Some(phy.battery)),
                state_dot(Some(phy.master)),
            )),
        ]));
    }

    lines.push(Line::from(Span::styled(
        format!("sampled {}", c.timestamp.format("%Y-%m-%d %H:%M:%S")),
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}
