//! Small UI helpers: unit formatting and sparkline scaling.

pub fn volts(v: f32) -> String {
    format!("{v:.2} V")
}

pub fn amps(a: f32) -> String {
    format!("{a:.2} A")
}

pub fn watts(w: f32) -> String {
    format!("{w:.1} W")
}

pub fn amp_hours(ah: f32) -> String {
    format!("{ah:.1} Ah")
}

pub fn kilowatt_hours(kwh: f32) -> String {
    format!("{kwh:.2} kWh")
}

pub fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

pub fn state_dot(state: Option<bool>) -> &'static str {
    match state {
        Some(true) => "●",
        Some(false) => "○",
        None => "·",
    }
}

// Sparklines take u64 samples; centiunits keep two decimals of resolution.
// Negative values (night-time discharge) clamp to zero.
pub fn centi(v: f64) -> u64 {
    (v * 100.0).max(0.0).round() as u64
}
