//! UI module root: exposes drawing functions for individual panels.

pub mod charts;
pub mod controls;
pub mod header;
pub mod readout;
pub mod util;
