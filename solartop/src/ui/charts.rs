//! Sparkline grid for the charted metrics.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Sparkline},
};

use crate::charts::{ChartSeries, ChartSet};
use crate::ui::util::centi;

fn draw_series_spark(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    series: &ChartSeries,
    color: Color,
) {
    let max_points = area.width.saturating_sub(2) as usize;
    let start = series.points.len().saturating_sub(max_points);
    let data: Vec<u64> = series
        .points
        .iter()
        .skip(start)
        .map(|&(_, v)| centi(v))
        .collect();

    let spark = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string()),
        )
        .data(&data)
        .style(Style::default().fg(color));
    f.render_widget(spark, area);
}

fn spark_title(name: &str, unit: &str, series: &ChartSeries) -> String {
    match series.latest() {
        Some(v) => format!("{name} ({unit}) — now: {v:.2}"),
        None => format!("{name} ({unit})"),
    }
}

pub fn draw_charts(f: &mut ratatui::Frame<'_>, area: Rect, charts: &ChartSet) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    draw_series_spark(
        f,
        top[0],
        &spark_title("Charge", "A", &charts.charge_current),
        &charts.charge_current,
        Color::Green,
    );
    draw_series_spark(
        f,
        top[1],
        &spark_title("Battery", "V", &charts.battery_voltage),
        &charts.battery_voltage,
        Color::Cyan,
    );
    draw_series_spark(
        f,
        bottom[0],
        &spark_title("Array", "W", &charts.array_power),
        &charts.array_power,
        Color::Yellow,
    );
    draw_series_spark(
        f,
        bottom[1],
        &spark_title("Charged", "Ah", &charts.ah_charge),
        &charts.ah_charge,
        Color::Magenta,
    );
}
