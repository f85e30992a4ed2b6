//! Decoding of the raw JSON responses that need more than a plain
//! `serde` derive.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{ActivityTotals, ClientError, IndexMapping, PoolCounters, Query, Result, ThreadPoolTotals};

/// Decode a response body for `query`.
pub(crate) fn decode<T: DeserializeOwned>(query: Query, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ClientError::Parse {
        query,
        message: e.to_string(),
    })
}

/// Decode an already-parsed JSON value for `query`.
pub(crate) fn decode_value<T: DeserializeOwned>(query: Query, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ClientError::Parse {
        query,
        message: e.to_string(),
    })
}

/// Extract `<index>.mappings` from a `GET <index>/_mapping` response.
pub(crate) fn mapping(index: &str, response: Value) -> Result<IndexMapping> {
    let parse_error = |message: &str| ClientError::Parse {
        query: Query::IndexMapping,
        message: message.to_string(),
    };

    let Value::Object(mut response) = response else {
        return Err(parse_error("unexpected mapping response format"));
    };
    let Some(Value::Object(mut index_data)) = response.remove(index) else {
        return Err(parse_error("unexpected mapping response format"));
    };
    let Some(Value::Object(mappings)) = index_data.remove("mappings") else {
        return Err(parse_error("no mappings found in response"));
    };

    Ok(IndexMapping {
        index_name: index.to_string(),
        mappings,
    })
}

#[derive(Debug, Deserialize)]
struct IndicesStatsResponse {
    #[serde(rename = "_all")]
    all: AllStats,
}

#[derive(Debug, Deserialize)]
struct AllStats {
    primaries: PrimaryStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PrimaryStats {
    indexing: IndexingStats,
    search: SearchStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IndexingStats {
    index_total: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchStats {
    query_total: u64,
}

/// Decode the `_all.primaries` counters of a `GET _stats` response.
pub(crate) fn activity(response: Value) -> Result<ActivityTotals> {
    let stats: IndicesStatsResponse = decode_value(Query::ClusterActivity, response)?;
    Ok(ActivityTotals {
        index_total: stats.all.primaries.indexing.index_total,
        search_total: stats.all.primaries.search.query_total,
    })
}

#[derive(Debug, Deserialize)]
struct NodesStatsResponse {
    #[serde(default)]
    nodes: BTreeMap<String, NodeThreadPools>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeThreadPools {
    thread_pool: BTreeMap<String, PoolStats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PoolStats {
    queue: u64,
    rejected: u64,
}

/// Sum the per-node pools of a `GET _nodes/stats/thread_pool` response.
pub(crate) fn thread_pools(response: Value) -> Result<ThreadPoolTotals> {
    let stats: NodesStatsResponse = decode_value(Query::ThreadPoolActivity, response)?;

    let mut totals = ThreadPoolTotals::new();
    for node in stats.nodes.into_values() {
        for (pool, s) in node.thread_pool {
            let entry: &mut PoolCounters = totals.entry(pool).or_default();
            entry.queue += s.queue;
            entry.rejected += s.rejected;
        }
    }
    Ok(totals)
}
