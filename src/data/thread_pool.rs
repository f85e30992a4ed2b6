//! Per-pool queue depth and rejection rate time series.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ostop_types::ThreadPoolTotals;

use super::metrics::{rate, seconds_between};
use super::ring::RingWindow;

/// Queue depth above which a pool is reported as a warning.
pub const QUEUE_WARNING_THRESHOLD: f64 = 100.0;

/// Thread-pool counters summed over all nodes at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPoolSnapshot {
    pub timestamp: DateTime<Utc>,
    pub pools: ThreadPoolTotals,
}

/// One pool's values in a [`ThreadPoolDataPoint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolSample {
    /// Instantaneous queue depth.
    pub queue_depth: f64,
    /// Rejections per second since the previous snapshot. `None` when the
    /// pool was not in the previous snapshot.
    pub rejection_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadPoolDataPoint {
    pub timestamp: DateTime<Utc>,
    pub pools: BTreeMap<String, PoolSample>,
}

/// Window statistics for one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThreadPoolSummary {
    pub current_queue: f64,
    pub average_queue: f64,
    pub peak_queue: f64,
    pub min_queue: f64,
    pub current_rejections: f64,
    pub average_rejections: f64,
    pub peak_rejections: f64,
}

/// Overall state of the thread pools in the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolHealth {
    Healthy,
    /// Some pool queues more than [`QUEUE_WARNING_THRESHOLD`] tasks.
    Warning,
    /// Some pool is currently rejecting work.
    Critical,
}

impl PoolHealth {
    pub fn label(self) -> &'static str {
        match self {
            PoolHealth::Healthy => "Healthy",
            PoolHealth::Warning => "Warning",
            PoolHealth::Critical => "Critical",
        }
    }
}

/// Rolling window of per-pool samples.
#[derive(Debug, Clone)]
pub struct ThreadPoolTimeSeries {
    points: RingWindow<ThreadPoolDataPoint>,
    baseline: Option<ThreadPoolSnapshot>,
}

impl ThreadPoolTimeSeries {
    pub fn new(max_size: usize) -> Self {
        Self {
            points: RingWindow::new(max_size),
            baseline: None,
        }
    }

    /// Feed a new snapshot. Returns true when a data point was produced.
    ///
    /// Mirrors [`MetricsTimeSeries::add_snapshot`](super::MetricsTimeSeries::add_snapshot):
    /// the first snapshot is the baseline, and a tick that is not strictly
    /// newer than the baseline is dropped entirely.
    pub fn add_snapshot(&mut self, snapshot: ThreadPoolSnapshot) -> bool {
        let Some(base) = self.baseline.as_ref() else {
            self.baseline = Some(snapshot);
            return false;
        };

        let Some(elapsed) = seconds_between(base.timestamp, snapshot.timestamp) else {
            return false;
        };

        let pools = snapshot
            .pools
            .iter()
            .map(|(name, counters)| {
                let sample = PoolSample {
                    queue_depth: counters.queue as f64,
                    rejection_rate: base
                        .pools
                        .get(name)
                        .map(|prev| rate(prev.rejected, counters.rejected, elapsed)),
                };
                (name.clone(), sample)
            })
            .collect();

        let point = ThreadPoolDataPoint {
            timestamp: snapshot.timestamp,
            pools,
        };

        self.baseline = Some(snapshot);
        if self.points.capacity() == 0 {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Statistics per pool over the window.
    ///
    /// Rejection figures use only the ticks where a rate was available;
    /// `current_rejections` is 0 when the newest tick has none for the pool.
    pub fn summary(&self) -> BTreeMap<String, ThreadPoolSummary> {
        let mut queues: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut rejections: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let newest = self.points.last();

        for point in self.points.iter() {
            for (name, sample) in &point.pools {
                queues.entry(name.as_str()).or_default().push(sample.queue_depth);
                if let Some(r) = sample.rejection_rate {
                    rejections.entry(name.as_str()).or_default().push(r);
                }
            }
        }

        queues
            .into_iter()
            .map(|(name, queue)| {
                let mut s = ThreadPoolSummary {
                    current_queue: queue.last().copied().unwrap_or_default(),
                    average_queue: mean(&queue),
                    peak_queue: queue.iter().copied().fold(f64::MIN, f64::max),
                    min_queue: queue.iter().copied().fold(f64::MAX, f64::min),
                    ..Default::default()
                };

                if let Some(rates) = rejections.get(name) {
                    s.current_rejections = newest
                        .and_then(|p| p.pools.get(name))
                        .and_then(|sample| sample.rejection_rate)
                        .unwrap_or_default();
                    s.average_rejections = mean(rates);
                    s.peak_rejections = rates.iter().copied().fold(0.0, f64::max);
                }

                (name.to_string(), s)
            })
            .collect()
    }

    /// Worst state across pools in the newest tick.
    pub fn health(&self) -> PoolHealth {
        let summary = self.summary();
        if summary.values().any(|s| s.current_rejections > 0.0) {
            PoolHealth::Critical
        } else if summary
            .values()
            .any(|s| s.current_queue > QUEUE_WARNING_THRESHOLD)
        {
            PoolHealth::Warning
        } else {
            PoolHealth::Healthy
        }
    }

    /// Queue depths of one pool from oldest to newest, for sparklines.
    pub fn queue_values(&self, pool: &str) -> Vec<f64> {
        self.points
            .iter()
            .filter_map(|p| p.pools.get(pool).map(|s| s.queue_depth))
            .collect()
    }

    pub fn data_points(&self) -> Vec<ThreadPoolDataPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.points.capacity()
    }

    /// Timestamps of the oldest and newest points.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.points.first()?.timestamp, self.points.last()?.timestamp))
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.baseline = None;
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ostop_types::PoolCounters;

    fn snapshot(secs: i64, pools: &[(&str, u64, u64)]) -> ThreadPoolSnapshot {
        ThreadPoolSnapshot {
            timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
            pools: pools
                .iter()
                .map(|(name, queue, rejected)| {
                    (
                        name.to_string(),
                        PoolCounters {
                            queue: *queue,
                            rejected: *rejected,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_first_snapshot_is_baseline() {
        let mut series = ThreadPoolTimeSeries::new(5);
        assert!(!series.add_snapshot(snapshot(0, &[("write", 3, 0)])));
        assert!(series.is_empty());
        assert!(series.summary().is_empty());
    }

    #[test]
    fn test_queue_depth_and_rejection_rate() {
        let mut series = ThreadPoolTimeSeries::new(5);
        series.add_snapshot(snapshot(0, &[("write", 0, 10)]));
        assert!(series.add_snapshot(snapshot(5, &[("write", 7, 35)])));

        let point = &series.data_points()[0];
        let write = point.pools["write"];
        assert_eq!(write.queue_depth, 7.0);
        assert_eq!(write.rejection_rate, Some(5.0));
    }

    #[test]
    fn test_new_pool_has_no_rejection_rate() {
        let mut series = ThreadPoolTimeSeries::new(5);
        series.add_snapshot(snapshot(0, &[("write", 0, 0)]));
        series.add_snapshot(snapshot(5, &[("write", 1, 0), ("search", 4, 100)]));

        let point = &series.data_points()[0];
        assert_eq!(point.pools["search"].queue_depth, 4.0);
        assert_eq!(point.pools["search"].rejection_rate, None);
        assert_eq!(point.pools["write"].rejection_rate, Some(0.0));
    }

    #[test]
    fn test_counter_reset_clamps_to_zero() {
        let mut series = ThreadPoolTimeSeries::new(5);
        series.add_snapshot(snapshot(0, &[("bulk", 0, 500)]));
        series.add_snapshot(snapshot(10, &[("bulk", 0, 3)]));
        assert_eq!(series.data_points()[0].pools["bulk"].rejection_rate, Some(0.0));
    }

    #[test]
    fn test_non_increasing_time_drops_tick() {
        let mut series = ThreadPoolTimeSeries::new(5);
        series.add_snapshot(snapshot(10, &[("write", 0, 0)]));
        assert!(!series.add_snapshot(snapshot(10, &[("write", 5, 5)])));
        assert!(!series.add_snapshot(snapshot(5, &[("write", 5, 5)])));
        assert!(series.is_empty());

        // Baseline is still the t=10 snapshot.
        series.add_snapshot(snapshot(20, &[("write", 0, 20)]));
        assert_eq!(series.data_points()[0].pools["write"].rejection_rate, Some(2.0));
    }

    #[test]
    fn test_zero_capacity_tracks_baseline_only() {
        let mut series = ThreadPoolTimeSeries::new(0);
        assert!(!series.add_snapshot(snapshot(0, &[("write", 0, 0)])));
        assert!(!series.add_snapshot(snapshot(5, &[("write", 3, 10)])));
        assert!(!series.add_snapshot(snapshot(10, &[("write", 4, 20)])));

        assert!(series.is_empty());
        assert!(series.summary().is_empty());
        let baseline = series.baseline.as_ref().unwrap();
        assert_eq!(baseline.timestamp, snapshot(10, &[]).timestamp);
        assert_eq!(baseline.pools["write"].rejected, 20);
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let mut series = ThreadPoolTimeSeries::new(2);
        for i in 0..5u64 {
            series.add_snapshot(snapshot(5 * i as i64, &[("write", i, 0)]));
        }
        assert_eq!(series.len(), 2);
        assert_eq!(series.queue_values("write"), vec![3.0, 4.0]);
    }

    #[test]
    fn test_summary() {
        let mut series = ThreadPoolTimeSeries::new(10);
        series.add_snapshot(snapshot(0, &[("write", 0, 0)]));
        series.add_snapshot(snapshot(1, &[("write", 2, 4)]));
        series.add_snapshot(snapshot(2, &[("write", 6, 4), ("search", 1, 0)]));
        series.add_snapshot(snapshot(3, &[("write", 4, 6), ("search", 3, 0)]));

        let summary = series.summary();
        let write = summary["write"];
        assert_eq!(write.current_queue, 4.0);
        assert_eq!(write.average_queue, 4.0);
        assert_eq!(write.peak_queue, 6.0);
        assert_eq!(write.min_queue, 2.0);
        assert_eq!(write.current_rejections, 2.0);
        assert_eq!(write.average_rejections, 2.0);
        assert_eq!(write.peak_rejections, 4.0);

        let search = summary["search"];
        assert_eq!(search.current_queue, 3.0);
        assert_eq!(search.min_queue, 1.0);
        // Only the t=3 tick has a rate for search.
        assert_eq!(search.average_rejections, 0.0);
    }

    #[test]
    fn test_single_point_summary() {
        let mut series = ThreadPoolTimeSeries::new(10);
        series.add_snapshot(snapshot(0, &[("get", 0, 0)]));
        series.add_snapshot(snapshot(1, &[("get", 9, 0)]));

        let get = series.summary()["get"];
        assert_eq!(get.current_queue, get.average_queue);
        assert_eq!(get.peak_queue, get.min_queue);
    }

    #[test]
    fn test_health() {
        let mut series = ThreadPoolTimeSeries::new(10);
        assert_eq!(series.health(), PoolHealth::Healthy);

        series.add_snapshot(snapshot(0, &[("write", 0, 0)]));
        series.add_snapshot(snapshot(1, &[("write", 150, 0)]));
        assert_eq!(series.health(), PoolHealth::Warning);

        series.add_snapshot(snapshot(2, &[("write", 150, 3)]));
        assert_eq!(series.health(), PoolHealth::Critical);
        assert_eq!(series.health().label(), "Critical");
    }

    #[test]
    fn test_time_range_and_clear() {
        let mut series = ThreadPoolTimeSeries::new(10);
        assert_eq!(series.time_range(), None);

        series.add_snapshot(snapshot(0, &[]));
        series.add_snapshot(snapshot(5, &[]));
        series.add_snapshot(snapshot(10, &[]));
        let (from, to) = series.time_range().unwrap();
        assert_eq!((to - from).num_seconds(), 5);

        series.clear();
        assert!(series.is_empty());
        assert_eq!(series.max_size(), 10);
    }
}
