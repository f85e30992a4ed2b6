//! Cluster throughput time series.
//!
//! Turns successive cumulative indexing/search counters into per-second
//! rates kept in a fixed-size [`RingWindow`].

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use super::ring::RingWindow;

/// Cumulative counters read from the cluster at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub index_total: u64,
    pub search_total: u64,
}

/// Rates derived from two consecutive snapshots, in operations per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsDataPoint {
    pub timestamp: DateTime<Utc>,
    pub insert_rate: f64,
    pub search_rate: f64,
}

/// Which rate a summary is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Insert,
    Search,
}

impl Metric {
    fn of(self, point: &MetricsDataPoint) -> f64 {
        match self {
            Metric::Insert => point.insert_rate,
            Metric::Search => point.search_rate,
        }
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(Metric::Insert),
            "search" => Ok(Metric::Search),
            other => Err(UnknownMetric(other.to_string())),
        }
    }
}

/// A metric name that is neither `insert` nor `search`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

/// Aggregate statistics over the current window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsSummary {
    pub current: f64,
    pub average: f64,
    pub peak: f64,
    pub min: f64,
}

/// Rolling window of throughput rates.
#[derive(Debug, Clone)]
pub struct MetricsTimeSeries {
    points: RingWindow<MetricsDataPoint>,
    baseline: Option<MetricsSnapshot>,
}

impl MetricsTimeSeries {
    /// Create an empty series keeping at most `max_size` points.
    pub fn new(max_size: usize) -> Self {
        Self {
            points: RingWindow::new(max_size),
            baseline: None,
        }
    }

    /// Feed a new snapshot. Returns true when a data point was produced.
    ///
    /// The first snapshot only becomes the baseline. A snapshot that is not
    /// strictly newer than the baseline is dropped without moving it. A
    /// counter that went backwards yields a rate of 0.
    pub fn add_snapshot(&mut self, snapshot: MetricsSnapshot) -> bool {
        let Some(base) = self.baseline else {
            self.baseline = Some(snapshot);
            return false;
        };

        let Some(elapsed) = seconds_between(base.timestamp, snapshot.timestamp) else {
            return false;
        };

        let point = MetricsDataPoint {
            timestamp: snapshot.timestamp,
            insert_rate: rate(base.index_total, snapshot.index_total, elapsed),
            search_rate: rate(base.search_total, snapshot.search_total, elapsed),
        };

        self.baseline = Some(snapshot);
        if self.points.capacity() == 0 {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Summary of one rate over the window; all zero when empty.
    pub fn summary(&self, metric: Metric) -> MetricsSummary {
        let Some(last) = self.points.last() else {
            return MetricsSummary::default();
        };

        let mut sum = 0.0;
        let mut peak = f64::MIN;
        let mut min = f64::MAX;
        for value in self.points.iter().map(|p| metric.of(p)) {
            sum += value;
            peak = peak.max(value);
            min = min.min(value);
        }

        MetricsSummary {
            current: metric.of(last),
            average: sum / self.points.len() as f64,
            peak,
            min,
        }
    }

    /// Summary by metric name; unknown names give an all-zero summary.
    pub fn summary_for(&self, name: &str) -> MetricsSummary {
        name.parse()
            .map(|metric| self.summary(metric))
            .unwrap_or_default()
    }

    /// Points from oldest to newest.
    pub fn data_points(&self) -> Vec<MetricsDataPoint> {
        self.points.iter().copied().collect()
    }

    /// Values of one rate from oldest to newest, for sparklines.
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.points.iter().map(|p| metric.of(p)).collect()
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

    pub fn is_full(&self) -> bool {
        self.points.is_full()
    }

    /// Span between the oldest and newest point; zero with fewer than two.
    pub fn time_range(&self) -> Duration {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => Duration::zero(),
        }
    }

    /// Forget all points and the baseline.
    pub fn clear(&mut self) {
        self.points.clear();
        self.baseline = None;
    }
}

/// Seconds from `from` to `to`, or `None` unless strictly positive.
pub(crate) fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<f64> {
    let delta = to - from;
    let seconds = delta.num_microseconds()? as f64 / 1_000_000.0;
    (seconds > 0.0).then_some(seconds)
}

/// Per-second rate between two counter readings, clamped at 0.
pub(crate) fn rate(previous: u64, current: u64, seconds: f64) -> f64 {
    current.saturating_sub(previous) as f64 / seconds
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64, index_total: u64, search_total: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
            index_total,
            search_total,
        }
    }

    #[test]
    fn test_first_snapshot_is_baseline() {
        let mut series = MetricsTimeSeries::new(5);
        assert!(!series.add_snapshot(at(0, 100, 100)));
        assert!(series.is_empty());
    }

    #[test]
    fn test_rate_from_two_snapshots() {
        let mut series = MetricsTimeSeries::new(1);
        series.add_snapshot(at(0, 1000, 0));
        assert!(series.add_snapshot(at(5, 1500, 50)));

        let points = series.data_points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].insert_rate, 100.0);
        assert_eq!(points[0].search_rate, 10.0);
    }

    #[test]
    fn test_zero_elapsed_is_dropped() {
        let mut series = MetricsTimeSeries::new(5);
        series.add_snapshot(at(0, 0, 0));
        series.add_snapshot(at(5, 50, 50));
        assert_eq!(series.len(), 1);

        assert!(!series.add_snapshot(at(5, 900, 900)));
        assert_eq!(series.len(), 1);

        // Baseline stayed at t=5 with totals 50.
        assert!(series.add_snapshot(at(10, 100, 100)));
        assert_eq!(series.data_points()[1].insert_rate, 10.0);
    }

    #[test]
    fn test_backwards_clock_is_dropped() {
        let mut series = MetricsTimeSeries::new(5);
        series.add_snapshot(at(10, 0, 0));
        assert!(!series.add_snapshot(at(5, 100, 100)));
        assert!(series.is_empty());
    }

    #[test]
    fn test_counter_reset_clamps_independently() {
        let mut series = MetricsTimeSeries::new(5);
        series.add_snapshot(at(0, 5000, 100));
        assert!(series.add_snapshot(at(10, 20, 300)));

        let point = series.data_points()[0];
        assert_eq!(point.insert_rate, 0.0);
        assert_eq!(point.search_rate, 20.0);
    }

    #[test]
    fn test_window_keeps_latest_rates_in_order() {
        // Snapshot i has total 100 * i^2, so every tick has a distinct rate.
        let mut series = MetricsTimeSeries::new(3);
        let rates: Vec<f64> = (0..5)
            .map(|i| (100 * (i + 1) * (i + 1) - 100 * i * i) as f64 / 5.0)
            .collect();
        for i in 0..6u64 {
            series.add_snapshot(at(5 * i as i64, 100 * i * i, 0));
        }

        assert_eq!(series.len(), 3);
        assert!(series.is_full());
        assert_eq!(series.values(Metric::Insert), rates[2..].to_vec());
    }

    #[test]
    fn test_window_size_property() {
        for n in 1..8usize {
            let mut series = MetricsTimeSeries::new(n);
            let k = n + 5;
            for i in 0..k as u64 {
                series.add_snapshot(at(5 * i as i64, 10 * i * i, 0));
            }
            let expected: Vec<f64> = (k - n..k)
                .map(|i| {
                    let i = i as u64;
                    (10 * i * i - 10 * (i - 1) * (i - 1)) as f64 / 5.0
                })
                .collect();
            assert_eq!(series.values(Metric::Insert), expected, "capacity {}", n);
        }
    }

    #[test]
    fn test_summary() {
        let mut series = MetricsTimeSeries::new(10);
        assert_eq!(series.summary(Metric::Insert), MetricsSummary::default());

        series.add_snapshot(at(0, 0, 0));
        series.add_snapshot(at(1, 10, 0));
        let single = series.summary(Metric::Insert);
        assert_eq!(single.current, 10.0);
        assert_eq!(single.average, 10.0);
        assert_eq!(single.peak, 10.0);
        assert_eq!(single.min, 10.0);

        series.add_snapshot(at(2, 40, 0));
        series.add_snapshot(at(3, 60, 0));
        let summary = series.summary(Metric::Insert);
        assert_eq!(summary.current, 20.0);
        assert_eq!(summary.average, 20.0);
        assert_eq!(summary.peak, 30.0);
        assert_eq!(summary.min, 10.0);
    }

    #[test]
    fn test_summary_for_unknown_metric() {
        let mut series = MetricsTimeSeries::new(10);
        series.add_snapshot(at(0, 0, 0));
        series.add_snapshot(at(1, 10, 10));

        assert_eq!(series.summary_for("search").current, 10.0);
        assert_eq!(series.summary_for("latency"), MetricsSummary::default());
        let err = "latency".parse::<Metric>().unwrap_err();
        assert_eq!(err.to_string(), "unknown metric: latency");
    }

    #[test]
    fn test_zero_capacity_tracks_baseline_only() {
        let mut series = MetricsTimeSeries::new(0);
        assert!(!series.add_snapshot(at(0, 0, 0)));
        assert!(!series.add_snapshot(at(5, 100, 100)));
        assert!(!series.add_snapshot(at(10, 200, 200)));
        assert!(series.is_empty());
    }

    #[test]
    fn test_time_range_and_clear() {
        let mut series = MetricsTimeSeries::new(10);
        series.add_snapshot(at(0, 0, 0));
        series.add_snapshot(at(5, 10, 0));
        assert_eq!(series.time_range(), Duration::zero());

        series.add_snapshot(at(15, 20, 0));
        assert_eq!(series.time_range(), Duration::seconds(10));

        series.clear();
        assert!(series.is_empty());
        assert!(!series.add_snapshot(at(20, 30, 0)));
    }
}
