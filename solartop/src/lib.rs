//! solartop: a terminal dashboard for a solar charge controller served over
//! WebSocket.
//!
//! The interesting part lives in [`session`]: one task owns the connection,
//! replays history into the charts as a single batch, polls for live and
//! decimated samples on separate timers, and reconnects immediately whenever
//! the link drops or goes stale. Everything it learns flows through the
//! [`session::TelemetrySink`] trait, which the TUI in [`app`] implements.

pub mod app;
pub mod charts;
pub mod profiles;
pub mod session;
pub mod types;
pub mod ui;
pub mod ws;
