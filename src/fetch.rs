//! Fetch orchestration against a [`ClusterClient`].
//!
//! The dashboard refresh is one fail-fast batch of fourteen queries issued in
//! [`Query::BATCH`] order: the first error aborts the rest and is returned
//! alone, so callers never see partial collections. The index mapping and
//! the two activity snapshots are separate single-query fetches with the
//! same error contract.
//!
//! ```
//! use ostop::fetch::fetch_cluster;
//! use ostop_client::{MockClient, Query};
//!
//! # tokio_test::block_on(async {
//! let client = MockClient::with_fixtures();
//! let data = fetch_cluster(&client).await.unwrap();
//! assert_eq!(data.health.cluster_name, "test-cluster");
//!
//! client.fail(Query::Nodes);
//! assert!(fetch_cluster(&client).await.is_err());
//! # });
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ostop_client::{
    AllocationInfo, ClientError, ClusterClient, ClusterHealth, ClusterStats, FielddataInfo,
    IndexInfo, IndexMapping, NodeInfo, PendingTaskInfo, PluginInfo, RecoveryInfo, SegmentInfo,
    ShardInfo, TaskInfo, TemplateInfo, ThreadPoolInfo,
};
use tracing::{debug, info};

use crate::data::{MetricsSnapshot, ThreadPoolSnapshot};

/// The result of a successful batch refresh.
///
/// Collections are reference counted so a refresh swaps them in whole and a
/// failed refresh leaves the previous ones untouched.
#[derive(Debug, Clone)]
pub struct ClusterData {
    pub health: Arc<ClusterHealth>,
    pub stats: Arc<ClusterStats>,
    pub nodes: Arc<Vec<NodeInfo>>,
    pub indices: Arc<Vec<IndexInfo>>,
    pub shards: Arc<Vec<ShardInfo>>,
    pub allocation: Arc<Vec<AllocationInfo>>,
    pub thread_pools: Arc<Vec<ThreadPoolInfo>>,
    pub tasks: Arc<Vec<TaskInfo>>,
    pub pending_tasks: Arc<Vec<PendingTaskInfo>>,
    pub recovery: Arc<Vec<RecoveryInfo>>,
    pub segments: Arc<Vec<SegmentInfo>>,
    pub fielddata: Arc<Vec<FielddataInfo>>,
    pub plugins: Arc<Vec<PluginInfo>>,
    pub templates: Arc<Vec<TemplateInfo>>,
    /// When the batch completed.
    pub refreshed_at: DateTime<Utc>,
}

/// Run the full dashboard batch.
pub async fn fetch_cluster(client: &dyn ClusterClient) -> Result<ClusterData, ClientError> {
    debug!(endpoint = client.description(), "starting cluster refresh");

    let data = ClusterData {
        health: Arc::new(client.cluster_health().await?),
        stats: Arc::new(client.cluster_stats().await?),
        nodes: Arc::new(client.nodes().await?),
        indices: Arc::new(client.indices().await?),
        shards: Arc::new(client.shards().await?),
        allocation: Arc::new(client.allocation().await?),
        thread_pools: Arc::new(client.thread_pool().await?),
        tasks: Arc::new(client.tasks().await?),
        pending_tasks: Arc::new(client.pending_tasks().await?),
        recovery: Arc::new(client.recovery().await?),
        segments: Arc::new(client.segments().await?),
        fielddata: Arc::new(client.fielddata().await?),
        plugins: Arc::new(client.plugins().await?),
        templates: Arc::new(client.templates().await?),
        refreshed_at: Utc::now(),
    };

    info!(
        cluster = %data.health.cluster_name,
        status = %data.health.status,
        nodes = data.nodes.len(),
        indices = data.indices.len(),
        "cluster refresh complete"
    );
    Ok(data)
}

/// Fetch the mapping of one index.
pub async fn fetch_mapping(
    client: &dyn ClusterClient,
    index: &str,
) -> Result<IndexMapping, ClientError> {
    debug!(%index, "fetching index mapping");
    client.index_mapping(index).await
}

/// Read the cumulative indexing/search counters, stamped with the current time.
pub async fn fetch_metrics(client: &dyn ClusterClient) -> Result<MetricsSnapshot, ClientError> {
    let totals = client.activity_totals().await?;
    Ok(MetricsSnapshot {
        timestamp: Utc::now(),
        index_total: totals.index_total,
        search_total: totals.search_total,
    })
}

/// Read per-pool queue and rejection counters, stamped with the current time.
pub async fn fetch_thread_pools(
    client: &dyn ClusterClient,
) -> Result<ThreadPoolSnapshot, ClientError> {
    let pools = client.thread_pool_totals().await?;
    Ok(ThreadPoolSnapshot {
        timestamp: Utc::now(),
        pools,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostop_client::{MockClient, Query};

    #[tokio::test]
    async fn test_fetch_cluster_success() {
        let client = MockClient::with_fixtures();
        let before = Utc::now();

        let data = fetch_cluster(&client).await.unwrap();

        assert_eq!(data.health.cluster_name, "test-cluster");
        assert_eq!(data.stats.indices.count, 3);
        assert_eq!(data.nodes.len(), 3);
        assert_eq!(data.indices.len(), 3);
        assert_eq!(data.shards.len(), 4);
        assert_eq!(data.templates[0].name, "logs");
        assert!(data.refreshed_at >= before);

        for query in Query::BATCH {
            assert_eq!(client.call_count(query), 1, "{}", query);
        }
        assert_eq!(client.total_calls(), Query::BATCH.len());
    }

    #[tokio::test]
    async fn test_fetch_cluster_fails_fast() {
        let client = MockClient::with_fixtures();
        client.fail(Query::Shards);

        let err = fetch_cluster(&client).await.unwrap_err();
        assert_eq!(err.query(), Some(Query::Shards));

        // Everything up to and including shards was issued, nothing after.
        let position = Query::BATCH
            .iter()
            .position(|q| *q == Query::Shards)
            .unwrap();
        for (i, query) in Query::BATCH.iter().enumerate() {
            let expected = usize::from(i <= position);
            assert_eq!(client.call_count(*query), expected, "{}", query);
        }
    }

    #[tokio::test]
    async fn test_fetch_cluster_first_query_error() {
        let client = MockClient::new();
        let err = fetch_cluster(&client).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Status {
                query: Query::ClusterHealth,
                status: 404
            }
        );
        assert_eq!(client.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_cluster_malformed_payload() {
        let client = MockClient::with_fixtures();
        client.set_fixture(Query::Templates, serde_json::json!("nope"));

        let err = fetch_cluster(&client).await.unwrap_err();
        assert!(matches!(err, ClientError::Parse { query: Query::Templates, .. }));
    }

    #[tokio::test]
    async fn test_fetch_mapping_is_independent() {
        let client = MockClient::with_fixtures();

        let mapping = fetch_mapping(&client, "logs-2024").await.unwrap();
        assert_eq!(mapping.index_name, "logs-2024");
        assert_eq!(client.total_calls(), 1);

        let err = fetch_mapping(&client, "missing").await.unwrap_err();
        assert_eq!(err.query(), Some(Query::IndexMapping));
    }

    #[tokio::test]
    async fn test_fetch_activity_snapshots() {
        let client = MockClient::with_fixtures();

        let metrics = fetch_metrics(&client).await.unwrap();
        assert_eq!(metrics.index_total, 10000);
        assert_eq!(metrics.search_total, 5000);

        let pools = fetch_thread_pools(&client).await.unwrap();
        assert_eq!(pools.pools["write"].rejected, 1);

        client.fail(Query::ClusterActivity);
        assert!(fetch_metrics(&client).await.is_err());
    }
}
