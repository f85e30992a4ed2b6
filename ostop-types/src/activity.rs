//! Cumulative activity counters read by the live monitors.
//!
//! These are raw, untimestamped readings. Rates are derived by the time
//! series engines in `ostop` from two consecutive readings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cluster-wide operation counters since the cluster (or its primaries)
/// started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTotals {
    /// Cumulative documents indexed on primaries.
    pub index_total: u64,
    /// Cumulative search queries on primaries.
    pub search_total: u64,
}

/// Counters of one thread pool, summed over every node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCounters {
    /// Tasks currently waiting in the queue.
    pub queue: u64,
    /// Cumulative rejected tasks.
    pub rejected: u64,
}

/// Thread-pool counters keyed by pool name (`search`, `write`, ...).
pub type ThreadPoolTotals = BTreeMap<String, PoolCounters>;
