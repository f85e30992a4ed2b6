//! Time-series engines for the live monitor views.
//!
//! Both engines turn successive cumulative-counter snapshots into
//! per-interval values kept in a fixed-capacity ring window.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing of interval strings (e.g., "5s", "500ms") and span formatting
//! - [`metrics`]: Cluster indexing/search throughput ([`MetricsTimeSeries`])
//! - [`thread_pool`]: Per-pool queue depth and rejection rate ([`ThreadPoolTimeSeries`])
//! - [`ring`]: The shared [`RingWindow`] buffer
//!
//! ## Data Flow
//!
//! ```text
//! ActivityTotals / ThreadPoolTotals (from the client)
//!        │
//!        ▼  stamped with the fetch time
//! MetricsSnapshot / ThreadPoolSnapshot
//!        │
//!        ▼  add_snapshot(): delta against the baseline
//! MetricsDataPoint / ThreadPoolDataPoint ──▶ RingWindow (oldest evicted)
//!        │
//!        ▼
//! summary() for the live panels
//! ```

pub mod duration;
pub mod metrics;
pub mod ring;
pub mod thread_pool;

pub use metrics::{Metric, MetricsDataPoint, MetricsSnapshot, MetricsSummary, MetricsTimeSeries};
pub use ring::RingWindow;
pub use thread_pool::{
    PoolHealth, PoolSample, ThreadPoolDataPoint, ThreadPoolSnapshot, ThreadPoolSummary,
    ThreadPoolTimeSeries,
};
