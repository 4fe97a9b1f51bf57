//! App state and main loop: input handling, folding session events, and drawing.

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::sleep;

use crate::charts::ChartSet;
use crate::session::{ConnStatus, SessionHandle, TelemetrySink};
use crate::types::{Stats, Target};
use crate::ui::{
    charts::draw_charts, controls::draw_controls, header::draw_header, readout::draw_readout,
};

/// Session output crossing from the session task to the UI task.
#[derive(Debug)]
pub enum SessionEvent {
    Status(ConnStatus),
    Latest(Stats),
    ChartBatch(Vec<Stats>),
}

/// The sink half handed to the session; forwards everything to the UI channel.
pub struct EventSink(UnboundedSender<SessionEvent>);

impl TelemetrySink for EventSink {
    fn status_changed(&mut self, status: &ConnStatus) {
        let _ = self.0.send(SessionEvent::Status(status.clone()));
    }
    fn display_latest(&mut self, sample: &Stats) {
        let _ = self.0.send(SessionEvent::Latest(*sample));
    }
    fn append_to_charts(&mut self, samples: &[Stats]) {
        let _ = self.0.send(SessionEvent::ChartBatch(samples.to_vec()));
    }
}

pub fn event_channel() -> (EventSink, UnboundedReceiver<SessionEvent>) {
    let (tx, rx) = unbounded_channel();
    (EventSink(tx), rx)
}

pub struct App {
    url: String,
    status: ConnStatus,
    latest: Option<Stats>,
    charts: ChartSet,
    selected: Target,
    should_quit: bool,
}

impl App {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ConnStatus::Connecting,
            latest: None,
            charts: ChartSet::default(),
            selected: Target::Load,
            should_quit: false,
        }
    }

    /// Fold one session event into the UI state.
    pub fn apply(&mut self, ev: SessionEvent) {
        match ev {
            SessionEvent::Status(status) => {
                // A new replay repaints the charts from scratch; curves left
                // over from the previous connection would splice into it.
                if status == ConnStatus::LoadingHistory {
                    self.charts.clear();
                }
                self.status = status;
            }
            SessionEvent::Latest(s) => self.latest = Some(s),
            SessionEvent::ChartBatch(batch) => self.charts.append_batch(&batch),
        }
    }

    pub async fn run(
        &mut self,
        handle: &SessionHandle,
        events: &mut UnboundedReceiver<SessionEvent>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, handle, events).await;

        // Teardown
        disable_raw_mode()?;
        let backend = terminal.backend_mut();
        execute!(backend, LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        handle: &SessionHandle,
        events: &mut UnboundedReceiver<SessionEvent>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    self.handle_key(k.code, handle);
                }
            }
            if self.should_quit {
                break;
            }

            // Fold in whatever the session produced since the last frame
            while let Ok(ev) = events.try_recv() {
                self.apply(ev);
            }

            // Draw
            terminal.draw(|f| self.draw(f))?;

            // Tick rate
            sleep(Duration::from_millis(100)).await;
        }

        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, handle: &SessionHandle) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => self.selected = next_target(self.selected),
            KeyCode::BackTab | KeyCode::Left => self.selected = prev_target(self.selected),
            KeyCode::Char('o') | KeyCode::Char('1') => handle.set(self.selected, true),
            KeyCode::Char('f') | KeyCode::Char('0') => handle.set(self.selected, false),
            _ => {}
        }
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        // Root rows: header, readout, chart grid, controls footer
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(9), // readout
                Constraint::Min(8),    // charts
                Constraint::Length(3), // controls
            ])
            .split(area);

        draw_header(f, rows[0], &self.url, &self.status);
        draw_readout(f, rows[1], self.latest.as_ref());
        draw_charts(f, rows[2], &self.charts);
        draw_controls(f, rows[3], self.selected, self.latest.as_ref());
    }
}

fn next_target(t: Target) -> Target {
    let i = Target::ALL.iter().position(|&x| x == t).unwrap_or(0);
    Target::ALL[(i + 1) % Target::ALL.len()]
}

fn prev_target(t: Target) -> Target {
    let i = Target::ALL.iter().position(|&x| x == t).unwrap_or(0);
    Target::ALL[(i + Target::ALL.len() - 1) % Target::ALL.len()]
}
