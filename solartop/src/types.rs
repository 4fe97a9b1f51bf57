//! Types that mirror the backend's JSON schema.
//!
//! Every message is one JSON value per WebSocket text frame, encoded with
//! serde's external enum tagging: unit variants are bare strings
//! (`"StatsCurrent"`), payload variants are single-key objects
//! (`{"StatsHistory":10}`, `{"Set":["Load",true]}`). Keep this module in
//! sync with the server; it defines the wire format.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Switchable targets: the controller's charge/load circuits plus the relay
/// board on the physical layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Load,
    Charging,
    PhySolar,
    PhyBattery,
    PhyMaster,
}

impl Target {
    pub const ALL: [Target; 5] = [
        Target::Load,
        Target::Charging,
        Target::PhySolar,
        Target::PhyBattery,
        Target::PhyMaster,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Target::Load => "Load",
            Target::Charging => "Charging",
            Target::PhySolar => "Solar",
            Target::PhyBattery => "Battery",
            Target::PhyMaster => "Master",
        }
    }
}

/// Charge controller state register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeState {
    Start,
    NightCheck,
    Disconnect,
    Night,
    Fault,
    Mppt,
    Absorption,
    Float,
    Equalize,
    Slave,
    Fixed,
}

impl ChargeState {
    pub fn label(&self) -> &'static str {
        match self {
            ChargeState::Start => "Start",
            ChargeState::NightCheck => "Night check",
            ChargeState::Disconnect => "Disconnect",
            ChargeState::Night => "Night",
            ChargeState::Fault => "Fault",
            ChargeState::Mppt => "MPPT",
            ChargeState::Absorption => "Absorption",
            ChargeState::Float => "Float",
            ChargeState::Equalize => "Equalize",
            ChargeState::Slave => "Slave",
            ChargeState::Fixed => "Fixed",
        }
    }

    /// True while the controller is actually pushing charge.
    pub fn is_charging(&self) -> bool {
        matches!(
            self,
            ChargeState::Mppt
                | ChargeState::Absorption
                | ChargeState::Float
                | ChargeState::Equalize
        )
    }
}

/// Load output state register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    Start,
    Normal,
    LvdWarning,
    Lvd,
    Fault,
    Disconnect,
    NormalOff,
    Override,
    NotUsed,
}

impl LoadState {
    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Start => "Start",
            LoadState::Normal => "Normal",
            LoadState::LvdWarning => "LVD warning",
            LoadState::Lvd => "LVD",
            LoadState::Fault => "Fault",
            LoadState::Disconnect => "Disconnect",
            LoadState::NormalOff => "Normal (off)",
            LoadState::Override => "Override",
            LoadState::NotUsed => "Not used",
        }
    }
}

/// Controller readings the dashboard consumes. The server serializes SI base
/// units, so cumulative charge arrives in ampere seconds and cumulative
/// energy in joules; use [`ControllerStats::ah_charge`] and
/// [`ControllerStats::kwh_charge`] for display values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerStats {
    pub timestamp: DateTime<Local>,
    pub battery_terminal_voltage: f32,
    pub charge_current: f32,
    pub array_power: f32,
    pub charge_state: ChargeState,
    pub load_state: LoadState,
    pub ah_charge_resettable: f32,
    pub kwh_charge_resettable: f32,
}

impl ControllerStats {
    /// Cumulative charge in amp hours (wire value is ampere seconds).
    pub fn ah_charge(&self) -> f32 {
        self.ah_charge_resettable / 3600.0
    }

    /// Cumulative energy in kilowatt hours (wire value is joules).
    pub fn kwh_charge(&self) -> f32 {
        self.kwh_charge_resettable / 3_600_000.0
    }
}

/// Relay states on the physical layer between panels, battery and bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phy {
    pub solar: bool,
    pub battery: bool,
    pub master: bool,
}

/// One telemetry sample, version tagged. `V0` servers send the bare
/// controller reading; `V1` adds the relay states. Unknown tags fail to
/// decode and are dropped by the session, never a crash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Stats {
    V0(ControllerStats),
    V1 { controller: ControllerStats, phy: Phy },
}

impl Stats {
    pub fn timestamp(&self) -> DateTime<Local> {
        match self {
            Stats::V0(s) => s.timestamp,
            Stats::V1 { controller, .. } => controller.timestamp,
        }
    }

    pub fn controller(&self) -> &ControllerStats {
        match self {
            Stats::V0(s) => s,
            Stats::V1 { controller, .. } => controller,
        }
    }

    pub fn phy(&self) -> Option<&Phy> {
        match self {
            Stats::V0(_) => None,
            Stats::V1 { phy, .. } => Some(phy),
        }
    }
}

/// Requests the dashboard sends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Replay the N most recent samples, then `EndOfHistory`.
    StatsHistory(i64),
    /// One live sample.
    StatsCurrent,
    /// One server-side decimated aggregate.
    StatsDecimated,
    /// Switch a target on or off.
    Set(Target, bool),
}

/// Everything the server may send back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    CmdOk,
    CmdErr(String),
    Stats(Stats),
    StatsDecimated(Stats),
    Status(Target, bool),
    EndOfHistory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn controller(ts_secs: i64) -> ControllerStats {
        ControllerStats {
            timestamp: Local.timestamp_opt(ts_secs, 0).unwrap(),
            battery_terminal_voltage: 12.5,
            charge_current: 3.25,
            array_power: 41.0,
            charge_state: ChargeState::Mppt,
            load_state: LoadState::Normal,
            ah_charge_resettable: 7200.0,
            kwh_charge_resettable: 7_200_000.0,
        }
    }

    #[test]
    fn requests_use_the_wire_shapes_the_server_expects() {
        let enc = |r: &Request| serde_json::to_string(r).unwrap();
        assert_eq!(enc(&Request::StatsCurrent), r#""StatsCurrent""#);
        assert_eq!(enc(&Request::StatsDecimated), r#""StatsDecimated""#);
        assert_eq!(enc(&Request::StatsHistory(10)), r#"{"StatsHistory":10}"#);
        assert_eq!(
            enc(&Request::Set(Target::Load, true)),
            r#"{"Set":["Load",true]}"#
        );
        assert_eq!(
            enc(&Request::Set(Target::PhyMaster, false)),
            r#"{"Set":["PhyMaster",false]}"#
        );
    }

    #[test]
    fn response_variants_decode() {
        assert_eq!(
            serde_json::from_str::<Response>(r#""CmdOk""#).unwrap(),
            Response::CmdOk
        );
        assert_eq!(
            serde_json::from_str::<Response>(r#"{"CmdErr":"not available"}"#).unwrap(),
            Response::CmdErr("not available".into())
        );
        assert_eq!(
            serde_json::from_str::<Response>(r#""EndOfHistory""#).unwrap(),
            Response::EndOfHistory
        );
        assert_eq!(
            serde_json::from_str::<Response>(r#"{"Status":["Charging",false]}"#).unwrap(),
            Response::Status(Target::Charging, false)
        );
    }

    #[test]
    fn samples_round_trip_in_both_versions() {
        let v0 = Stats::V0(controller(1_700_000_000));
        let v1 = Stats::V1 {
            controller: controller(1_700_000_060),
            phy: Phy { solar: true, battery: true, master: false },
        };
        for s in [v0, v1] {
            let json = serde_json::to_string(&Response::Stats(s)).unwrap();
            match serde_json::from_str::<Response>(&json).unwrap() {
                Response::Stats(back) => assert_eq!(back, s),
                other => panic!("expected Stats, got {other:?}"),
            }
        }
        assert_eq!(v0.phy(), None);
        assert!(v1.phy().is_some());
        assert_eq!(v1.timestamp(), v1.controller().timestamp);
    }

    #[test]
    fn unknown_version_tags_and_shapes_fail_to_decode() {
        // A schema bump the client does not know about must surface as a
        // decode error, which the session logs and drops.
        let err = serde_json::from_str::<Response>(r#"{"Stats":{"V9":{"volts":900}}}"#);
        assert!(err.is_err());
        assert!(serde_json::from_str::<Response>(r#"{"Mystery":1}"#).is_err());
        assert!(serde_json::from_str::<Response>("not json at all").is_err());
    }

    #[test]
    fn display_units_convert_from_si() {
        let c = controller(0);
        // 7200 ampere seconds are exactly two amp hours.
        assert_eq!(c.ah_charge(), 2.0);
        // 7.2 million joules are exactly two kilowatt hours.
        assert_eq!(c.kwh_charge(), 2.0);
    }
}
