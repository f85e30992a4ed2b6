//! In-memory cluster client for tests.
//!
//! [`MockClient`] answers each [`Query`] from a JSON fixture in the same
//! wire format the cluster returns, so decoding is exercised exactly as with
//! the HTTP client. A query without a fixture answers with status 404.
//!
//! ```rust,ignore
//! use ostop_client::{ClusterClient, MockClient, Query};
//!
//! let client = MockClient::with_fixtures();
//! client.fail(Query::Shards);
//!
//! assert!(client.cluster_health().await.is_ok());
//! assert!(client.shards().await.is_err());
//! assert_eq!(client.call_count(Query::Shards), 1);
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::wire;
use crate::{
    ActivityTotals, AllocationInfo, ClientError, ClusterClient, ClusterHealth, ClusterStats,
    FielddataInfo, IndexInfo, IndexMapping, NodeInfo, PendingTaskInfo, PluginInfo, Query,
    RecoveryInfo, Result, SegmentInfo, ShardInfo, TaskInfo, TemplateInfo, ThreadPoolInfo,
    ThreadPoolTotals,
};

#[derive(Debug, Default)]
struct MockState {
    fixtures: HashMap<Query, Value>,
    errors: HashMap<Query, ClientError>,
    calls: HashMap<Query, usize>,
}

/// A scripted [`ClusterClient`].
#[derive(Debug, Default)]
pub struct MockClient {
    state: Mutex<MockState>,
}

impl MockClient {
    /// A client with no fixtures; every query answers 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// A client with a small three-node cluster loaded for every query.
    pub fn with_fixtures() -> Self {
        let client = Self::new();
        for (query, value) in standard_fixtures() {
            client.set_fixture(query, value);
        }
        client
    }

    /// Set the response body for a query.
    pub fn set_fixture(&self, query: Query, value: Value) {
        self.state.lock().fixtures.insert(query, value);
    }

    /// Make a query fail with the given error until cleared.
    pub fn set_error(&self, query: Query, error: ClientError) {
        self.state.lock().errors.insert(query, error);
    }

    /// Make a query fail with a connection error.
    pub fn fail(&self, query: Query) {
        self.set_error(
            query,
            ClientError::Connection {
                query,
                message: format!("mock error for {}", query),
            },
        );
    }

    /// Remove an injected error.
    pub fn clear_error(&self, query: Query) {
        self.state.lock().errors.remove(&query);
    }

    /// Number of times a query was issued.
    pub fn call_count(&self, query: Query) -> usize {
        self.state.lock().calls.get(&query).copied().unwrap_or(0)
    }

    /// Number of queries issued in total.
    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }

    /// Forget all recorded calls.
    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn respond_value(&self, query: Query) -> Result<Value> {
        let mut state = self.state.lock();
        *state.calls.entry(query).or_default() += 1;

        if let Some(err) = state.errors.get(&query) {
            return Err(err.clone());
        }
        state
            .fixtures
            .get(&query)
            .cloned()
            .ok_or(ClientError::Status { query, status: 404 })
    }

    fn respond<T: DeserializeOwned>(&self, query: Query) -> Result<T> {
        let value = self.respond_value(query)?;
        wire::decode_value(query, value)
    }
}

#[async_trait]
impl ClusterClient for MockClient {
    fn description(&self) -> &str {
        "mock://cluster"
    }

    async fn cluster_health(&self) -> Result<ClusterHealth> {
        self.respond(Query::ClusterHealth)
    }

    async fn cluster_stats(&self) -> Result<ClusterStats> {
        self.respond(Query::ClusterStats)
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>> {
        self.respond(Query::Nodes)
    }

    async fn indices(&self) -> Result<Vec<IndexInfo>> {
        self.respond(Query::Indices)
    }

    async fn shards(&self) -> Result<Vec<ShardInfo>> {
        self.respond(Query::Shards)
    }

    async fn allocation(&self) -> Result<Vec<AllocationInfo>> {
        self.respond(Query::Allocation)
    }

    async fn thread_pool(&self) -> Result<Vec<ThreadPoolInfo>> {
        self.respond(Query::ThreadPool)
    }

    async fn tasks(&self) -> Result<Vec<TaskInfo>> {
        self.respond(Query::Tasks)
    }

    async fn pending_tasks(&self) -> Result<Vec<PendingTaskInfo>> {
        self.respond(Query::PendingTasks)
    }

    async fn recovery(&self) -> Result<Vec<RecoveryInfo>> {
        self.respond(Query::Recovery)
    }

    async fn segments(&self) -> Result<Vec<SegmentInfo>> {
        self.respond(Query::Segments)
    }

    async fn fielddata(&self) -> Result<Vec<FielddataInfo>> {
        self.respond(Query::Fielddata)
    }

    async fn plugins(&self) -> Result<Vec<PluginInfo>> {
        self.respond(Query::Plugins)
    }

    async fn templates(&self) -> Result<Vec<TemplateInfo>> {
        self.respond(Query::Templates)
    }

    async fn index_mapping(&self, index: &str) -> Result<IndexMapping> {
        let value = self.respond_value(Query::IndexMapping)?;
        wire::mapping(index, value)
    }

    async fn activity_totals(&self) -> Result<ActivityTotals> {
        let value = self.respond_value(Query::ClusterActivity)?;
        wire::activity(value)
    }

    async fn thread_pool_totals(&self) -> Result<ThreadPoolTotals> {
        let value = self.respond_value(Query::ThreadPoolActivity)?;
        wire::thread_pools(value)
    }
}

fn standard_fixtures() -> Vec<(Query, Value)> {
    vec![
        (
            Query::ClusterHealth,
            json!({
                "cluster_name": "test-cluster",
                "status": "green",
                "timed_out": false,
                "number_of_nodes": 3,
                "number_of_data_nodes": 3,
                "active_primary_shards": 6,
                "active_shards": 12,
                "relocating_shards": 0,
                "initializing_shards": 0,
                "unassigned_shards": 0
            }),
        ),
        (
            Query::ClusterStats,
            json!({
                "cluster_name": "test-cluster",
                "status": "green",
                "indices": {"count": 3, "docs": {"count": 15000}, "store": {"size_in_bytes": 52428800}},
                "nodes": {"count": {"total": 3, "data": 3}}
            }),
        ),
        (
            Query::Nodes,
            json!([
                {"ip": "10.0.0.1", "heap.percent": "45", "ram.percent": "70", "cpu": "12", "load_1m": "0.5", "load_5m": "0.4", "load_15m": "0.3", "node.role": "dimr", "master": "*", "name": "node-1", "disk.used_percent": "40.1", "disk.used": "40gb", "disk.avail": "60gb", "disk.total": "100gb"},
                {"ip": "10.0.0.2", "heap.percent": "38", "ram.percent": "65", "cpu": "8", "load_1m": "0.2", "load_5m": "0.2", "load_15m": "0.2", "node.role": "dimr", "master": "-", "name": "node-2", "disk.used_percent": "35.0", "disk.used": "35gb", "disk.avail": "65gb", "disk.total": "100gb"},
                {"ip": "10.0.0.3", "heap.percent": "51", "ram.percent": "72", "cpu": "20", "load_1m": "1.1", "load_5m": "0.9", "load_15m": "0.7", "node.role": "dimr", "master": "-", "name": "node-3", "disk.used_percent": "55.5", "disk.used": "55gb", "disk.avail": "45gb", "disk.total": "100gb"}
            ]),
        ),
        (
            Query::Indices,
            json!([
                {"health": "green", "status": "open", "index": "logs-2024", "uuid": "u1", "pri": "2", "rep": "1", "docs.count": "10000", "docs.deleted": "12", "store.size": "30mb", "pri.store.size": "15mb"},
                {"health": "green", "status": "open", "index": "metrics", "uuid": "u2", "pri": "2", "rep": "1", "docs.count": "4000", "docs.deleted": "0", "store.size": "15mb", "pri.store.size": "7.5mb"},
                {"health": "green", "status": "open", "index": "users", "uuid": "u3", "pri": "2", "rep": "1", "docs.count": "1000", "docs.deleted": "3", "store.size": "5mb", "pri.store.size": "2.5mb"}
            ]),
        ),
        (
            Query::Shards,
            json!([
                {"index": "logs-2024", "shard": "0", "prirep": "p", "state": "STARTED", "docs": "5000", "store": "7.5mb", "ip": "10.0.0.1", "node": "node-1"},
                {"index": "logs-2024", "shard": "0", "prirep": "r", "state": "STARTED", "docs": "5000", "store": "7.5mb", "ip": "10.0.0.2", "node": "node-2"},
                {"index": "metrics", "shard": "0", "prirep": "p", "state": "STARTED", "docs": "2000", "store": "3.7mb", "ip": "10.0.0.3", "node": "node-3"},
                {"index": "users", "shard": "1", "prirep": "r", "state": "UNASSIGNED", "docs": null, "store": null, "ip": null, "node": null}
            ]),
        ),
        (
            Query::Allocation,
            json!([
                {"shards": "4", "disk.indices": "20mb", "disk.used": "40gb", "disk.avail": "60gb", "disk.total": "100gb", "disk.percent": "40", "host": "10.0.0.1", "ip": "10.0.0.1", "node": "node-1"}
            ]),
        ),
        (
            Query::ThreadPool,
            json!([
                {"node_name": "node-1", "name": "search", "active": "1", "queue": "0", "rejected": "0", "completed": "1200", "size": "7"},
                {"node_name": "node-1", "name": "write", "active": "0", "queue": "2", "rejected": "1", "completed": "800", "size": "4"}
            ]),
        ),
        (
            Query::Tasks,
            json!([
                {"action": "indices:data/read/search", "task_id": "n1:100", "parent_task_id": "-", "type": "transport", "start_time": "1700000000000", "timestamp": "12:00:00", "running_time": "3.2ms", "ip": "10.0.0.1", "node": "node-1", "description": "search"}
            ]),
        ),
        (
            Query::PendingTasks,
            json!([
                {"insertOrder": "1", "timeInQueue": "120ms", "priority": "URGENT", "source": "create-index [new]"}
            ]),
        ),
        (Query::Recovery, json!([])),
        (
            Query::Segments,
            json!([
                {"index": "logs-2024", "shard": "0", "prirep": "p", "ip": "10.0.0.1", "segment": "_0", "generation": "0", "docs.count": "5000", "docs.deleted": "0", "size": "7mb", "committed": "true"}
            ]),
        ),
        (
            Query::Fielddata,
            json!([
                {"id": "n1", "host": "10.0.0.1", "ip": "10.0.0.1", "node": "node-1", "field": "user.keyword", "size": "1.2kb"}
            ]),
        ),
        (
            Query::Plugins,
            json!([
                {"id": "n1", "name": "node-1", "component": "opensearch-security", "version": "2.11.0", "description": "security"}
            ]),
        ),
        (
            Query::Templates,
            json!([
                {"name": "logs", "index_patterns": "[logs-*]", "order": "0", "version": null}
            ]),
        ),
        (
            Query::IndexMapping,
            json!({
                "logs-2024": {"mappings": {"properties": {"message": {"type": "text"}, "level": {"type": "keyword"}}}},
                "metrics": {"mappings": {"properties": {"value": {"type": "double"}}}},
                "users": {"mappings": {"properties": {"name": {"type": "keyword"}}}}
            }),
        ),
        (
            Query::ClusterActivity,
            json!({"_all": {"primaries": {"indexing": {"index_total": 10000}, "search": {"query_total": 5000}}}}),
        ),
        (
            Query::ThreadPoolActivity,
            json!({"nodes": {"n1": {"thread_pool": {"search": {"queue": 0, "rejected": 0}, "write": {"queue": 2, "rejected": 1}}}}}),
        ),
    ]
}
