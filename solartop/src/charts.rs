//! Bounded chart buffers for the four dashboard metrics.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::types::Stats;

/// Default retained length: one point per minute for 24h.
pub const DEFAULT_CAP: usize = 1440;

pub type ChartPoint = (DateTime<Local>, f64);

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// One metric's timeline, trimmed from the front once it reaches `cap`.
pub struct ChartSeries {
    pub points: VecDeque<ChartPoint>,
    cap: usize,
}

impl ChartSeries {
    pub fn new(cap: usize) -> Self {
        Self { points: VecDeque::with_capacity(cap), cap }
    }

    pub fn push(&mut self, ts: DateTime<Local>, value: f64) {
        push_capped(&mut self.points, (ts, value), self.cap);
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.back().map(|&(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// The four charted metrics, each fed from the same sample.
pub struct ChartSet {
    pub charge_current: ChartSeries,  // A
    pub ah_charge: ChartSeries,       // Ah
    pub battery_voltage: ChartSeries, // V
    pub array_power: ChartSeries,     // W
}

impl ChartSet {
    pub fn new(cap: usize) -> Self {
        Self {
            charge_current: ChartSeries::new(cap),
            ah_charge: ChartSeries::new(cap),
            battery_voltage: ChartSeries::new(cap),
            array_power: ChartSeries::new(cap),
        }
    }

    pub fn append(&mut self, sample: &Stats) {
        let ts = sample.timestamp();
        let c = sample.controller();
        self.charge_current.push(ts, c.charge_current as f64);
        self.ah_charge.push(ts, c.ah_charge() as f64);
        self.battery_voltage.push(ts, c.battery_terminal_voltage as f64);
        self.array_power.push(ts, c.array_power as f64);
    }

    pub fn append_batch(&mut self, samples: &[Stats]) {
        for s in samples {
            self.append(s);
        }
    }

    pub fn clear(&mut self) {
        self.charge_current.clear();
        self.ah_charge.clear();
        self.battery_voltage.clear();
        self.array_power.clear();
    }
}

impl Default for ChartSet {
    fn default() -> Self {
        Self::new(DEFAULT_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChargeState, ControllerStats, LoadState, Stats};
    use chrono::TimeZone;

    fn sample(ts_secs: i64, amps: f32) -> Stats {
        Stats::V0(ControllerStats {
            timestamp: Local.timestamp_opt(ts_secs, 0).unwrap(),
            battery_terminal_voltage: 12.8,
            charge_current: amps,
            array_power: 40.0,
            charge_state: ChargeState::Float,
            load_state: LoadState::Normal,
            ah_charge_resettable: 7200.0,
            kwh_charge_resettable: 3_600_000.0,
        })
    }

    #[test]
    fn series_evicts_oldest_first_at_cap() {
        let mut s = ChartSeries::new(3);
        for i in 0..5 {
            s.push(Local.timestamp_opt(i, 0).unwrap(), i as f64);
        }
        assert_eq!(s.len(), 3);
        let values: Vec<f64> = s.points.iter().map(|&(_, v)| v).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert_eq!(s.latest(), Some(4.0));
    }

    #[test]
    fn series_never_exceeds_cap() {
        let mut s = ChartSeries::new(8);
        for i in 0..1000 {
            s.push(Local.timestamp_opt(i, 0).unwrap(), 0.0);
            assert!(s.len() <= 8);
        }
    }

    #[test]
    fn append_extracts_converted_metrics() {
        let mut set = ChartSet::new(16);
        set.append(&sample(60, 3.5));
        assert_eq!(set.charge_current.latest(), Some(3.5));
        assert_eq!(set.ah_charge.latest(), Some(2.0)); // 7200 As
        assert_eq!(set.battery_voltage.latest(), Some(12.8f32 as f64));
        assert_eq!(set.array_power.latest(), Some(40.0));
    }

    #[test]
    fn batch_appends_keep_order_and_clear_resets() {
        let mut set = ChartSet::new(16);
        let batch = [sample(0, 1.0), sample(60, 2.0), sample(120, 3.0)];
        set.append_batch(&batch);
        let amps: Vec<f64> = set.charge_current.points.iter().map(|&(_, v)| v).collect();
        assert_eq!(amps, vec![1.0, 2.0, 3.0]);
        set.clear();
        assert!(set.charge_current.is_empty());
        assert!(set.ah_charge.is_empty());
        assert!(set.battery_voltage.is_empty());
        assert!(set.array_power.is_empty());
    }
}
