//! Telemetry session: owns the WebSocket connection and drives the
//! reconnect / history replay / live polling lifecycle.
//!
//! The session runs as one task and reports everything it learns through a
//! [`TelemetrySink`]. A connection always starts with a history replay:
//! replayed samples are buffered and handed to the sink as a single batch
//! when the server signals end of history, so charts fill in one step
//! instead of animating through the backlog. Only after that do the two
//! poll timers start asking for live and decimated samples.

use std::fmt;
use std::mem;
use std::time::Duration;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::types::{Request, Response, Stats, Target};
use crate::ws::{self, WsStream};

/// How many history samples to replay when none is configured.
pub const DEFAULT_HISTORY: i64 = 10;

pub struct SessionConfig {
    pub url: String,
    /// History samples requested on every (re)connect.
    pub history: i64,
    /// Cadence of live readout polls once replay has finished.
    pub live_poll: Duration,
    /// Cadence of decimated chart polls once replay has finished.
    pub decimated_refresh: Duration,
    /// Close and reconnect if the server sends nothing for this long.
    pub stale_after: Duration,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            history: DEFAULT_HISTORY,
            live_poll: Duration::from_secs(5),
            decimated_refresh: Duration::from_secs(60),
            stale_after: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Disconnected,
    Connecting,
    ReplayingHistory,
    Live,
}

/// Connection lifecycle as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnStatus {
    Connecting,
    LoadingHistory,
    Connected,
    Disconnected(DisconnectReason),
}

impl fmt::Display for ConnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnStatus::Connecting => write!(f, "Connecting"),
            ConnStatus::LoadingHistory => write!(f, "Loading History"),
            ConnStatus::Connected => write!(f, "Connected"),
            ConnStatus::Disconnected(reason) => write!(f, "Disconnected ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectReason {
    #[error("closed by server")]
    Closed,
    #[error("{0}")]
    ConnectionError(String),
    #[error("no traffic for {0:?}")]
    Stale(Duration),
}

enum Command {
    Set(Target, bool),
    Stop,
}

/// Cloneable handle for poking the session from the UI task.
#[derive(Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<Command>,
}

impl SessionHandle {
    /// Ask the controller to switch a relay. Dropped on the floor when no
    /// connection is up; the server's Status broadcast is the ground truth.
    pub fn set(&self, target: Target, on: bool) {
        let _ = self.tx.send(Command::Set(target, on));
    }

    /// Shut the session down: the run loop closes the socket and exits.
    pub fn stop(&self) {
        let _ = self.tx.send(Command::Stop);
    }
}

/// Where session output lands. The TUI implements this; tests record it.
pub trait TelemetrySink {
    fn status_changed(&mut self, status: &ConnStatus);
    /// A fresh live sample for the readout. Never charted.
    fn display_latest(&mut self, sample: &Stats);
    /// Chart samples in timestamp order: one replayed batch, or a single
    /// decimated sample.
    fn append_to_charts(&mut self, samples: &[Stats]);
}

struct Stopped;

pub struct Session<S> {
    cfg: SessionConfig,
    sink: S,
    commands: UnboundedReceiver<Command>,
    state: SessionState,
    history: Vec<Stats>,
}

impl<S: TelemetrySink> Session<S> {
    pub fn new(cfg: SessionConfig, sink: S) -> (Self, SessionHandle) {
        let (tx, commands) = unbounded_channel();
        let session = Self {
            cfg,
            sink,
            commands,
            state: SessionState::Disconnected,
            history: Vec::new(),
        };
        (session, SessionHandle { tx })
    }

    /// Drive the session until [`SessionHandle::stop`] is called or every
    /// handle is dropped. Reconnects immediately after any disconnect.
    pub async fn run(mut self) {
        loop {
            self.transition(SessionState::Connecting, ConnStatus::Connecting);
            let mut ws = tokio::select! {
                r = ws::connect(&self.cfg.url) => match r {
                    Ok(ws) => ws,
                    Err(e) => {
                        debug!("connect to {} failed: {e}", self.cfg.url);
                        self.transition(
                            SessionState::Disconnected,
                            ConnStatus::Disconnected(DisconnectReason::ConnectionError(
                                e.to_string(),
                            )),
                        );
                        continue;
                    }
                },
                _ = drain_while_disconnected(&mut self.commands) => return,
            };

            // The connect future can win the select with a command still
            // queued; anything issued while disconnected is dropped here
            // rather than forwarded over the fresh connection.
            loop {
                match self.commands.try_recv() {
                    Ok(Command::Set(target, on)) => {
                        debug!("not connected, dropping set {target:?} -> {on}");
                    }
                    Ok(Command::Stop) => {
                        let _ = ws.close(None).await;
                        return;
                    }
                    Err(_) => break,
                }
            }

            match self.run_connection(&mut ws).await {
                Ok(reason) => {
                    let _ = ws.close(None).await;
                    // A partial replay is worthless; the next connection
                    // starts its own.
                    self.history.clear();
                    info!("disconnected: {reason}");
                    self.transition(
                        SessionState::Disconnected,
                        ConnStatus::Disconnected(reason),
                    );
                }
                Err(Stopped) => {
                    let _ = ws.close(None).await;
                    return;
                }
            }
        }
    }

    /// One established connection, from history request to disconnect.
    async fn run_connection(&mut self, ws: &mut WsStream) -> Result<DisconnectReason, Stopped> {
        self.transition(SessionState::ReplayingHistory, ConnStatus::LoadingHistory);
        if let Err(e) = ws::send_request(ws, &Request::StatsHistory(self.cfg.history)).await {
            return Ok(DisconnectReason::ConnectionError(e.to_string()));
        }

        // Both pollers tick on the wall clock from connection establishment,
        // first tick one full period out. Skipped while replay is still
        // running, without bursting to catch up afterwards.
        let mut live_poll = interval_at(Instant::now() + self.cfg.live_poll, self.cfg.live_poll);
        live_poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut decimated = interval_at(
            Instant::now() + self.cfg.decimated_refresh,
            self.cfg.decimated_refresh,
        );
        decimated.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_rx = Instant::now();

        loop {
            let outbound: Option<Request> = tokio::select! {
                frame = ws.next() => match frame {
                    None => return Ok(DisconnectReason::Closed),
                    Some(Err(e)) => return Ok(DisconnectReason::ConnectionError(e.to_string())),
                    // A close handshake ends the connection even if the peer
                    // keeps the TCP socket open afterwards.
                    Some(Ok(Message::Close(frame))) => {
                        debug!("close frame from server: {frame:?}");
                        return Ok(DisconnectReason::Closed);
                    }
                    Some(Ok(msg)) => {
                        last_rx = Instant::now();
                        self.handle_frame(msg);
                        None
                    }
                },
                _ = live_poll.tick(), if self.state == SessionState::Live => {
                    Some(Request::StatsCurrent)
                }
                _ = decimated.tick(), if self.state == SessionState::Live => {
                    Some(Request::StatsDecimated)
                }
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Set(target, on)) => Some(Request::Set(target, on)),
                    Some(Command::Stop) | None => return Err(Stopped),
                },
                _ = sleep_until(last_rx + self.cfg.stale_after) => {
                    return Ok(DisconnectReason::Stale(self.cfg.stale_after));
                }
            };
            if let Some(req) = outbound {
                if let Err(e) = ws::send_request(ws, &req).await {
                    return Ok(DisconnectReason::ConnectionError(e.to_string()));
                }
            }
        }
    }

    // Close frames never reach this point; the connection loop turns them
    // into a disconnect.
    fn handle_frame(&mut self, msg: Message) {
        match msg {
            Message::Text(raw) => self.handle_message(&raw),
            Message::Binary(b) => debug!("ignoring {} byte binary frame", b.len()),
            Message::Close(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }

    fn handle_message(&mut self, raw: &str) {
        let resp: Response = match serde_json::from_str(raw) {
            Ok(resp) => resp,
            Err(e) => {
                warn!("unrecognized message from server: {e}");
                return;
            }
        };
        match resp {
            Response::CmdOk => debug!("command acknowledged"),
            Response::CmdErr(e) => warn!("command rejected: {e}"),
            Response::Status(target, on) => {
                info!("{} is {}", target.label(), if on { "on" } else { "off" });
            }
            Response::EndOfHistory => self.finish_replay(),
            Response::Stats(s) => {
                if self.state == SessionState::ReplayingHistory {
                    self.history.push(s);
                } else {
                    self.sink.display_latest(&s);
                }
            }
            Response::StatsDecimated(s) => self.sink.append_to_charts(std::slice::from_ref(&s)),
        }
    }

    fn finish_replay(&mut self) {
        if self.state != SessionState::ReplayingHistory {
            debug!("end-of-history outside replay, ignoring");
            return;
        }
        let batch = mem::take(&mut self.history);
        info!("history replay complete, {} samples", batch.len());
        self.sink.append_to_charts(&batch);
        self.transition(SessionState::Live, ConnStatus::Connected);
    }

    fn transition(&mut self, state: SessionState, status: ConnStatus) {
        self.state = state;
        self.sink.status_changed(&status);
    }
}

/// While no connection exists, set requests are dropped rather than queued.
/// Resolves only once the session is told to stop (or every handle is gone).
async fn drain_while_disconnected(commands: &mut UnboundedReceiver<Command>) {
    loop {
        match commands.recv().await {
            Some(Command::Set(target, on)) => {
                debug!("not connected, dropping set {target:?} -> {on}");
            }
            Some(Command::Stop) | None => return,
        }
    }
}
