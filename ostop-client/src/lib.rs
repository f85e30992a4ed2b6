//! # ostop-client
//!
//! The cluster client capability consumed by `ostop`.
//!
//! [`ClusterClient`] is a fixed catalogue of named, read-only queries against
//! the monitoring surface of an OpenSearch (or Elasticsearch compatible)
//! cluster. Every query returns a typed payload from [`ostop_types`] or a
//! [`ClientError`]. Implementations must be safe to share between concurrent
//! background tasks.
//!
//! - [`OpenSearchClient`]: the HTTP implementation, built on reqwest.
//! - [`MockClient`] (`mock` feature): an in-memory client answering from
//!   JSON fixtures, with per-query error injection and call counting.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ostop_client::{ClusterClient, OpenSearchClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenSearchClient::builder()
//!         .endpoint("http://localhost:9200")
//!         .build()?;
//!
//!     let health = client.cluster_health().await?;
//!     println!("{} is {}", health.cluster_name, health.status);
//!     Ok(())
//! }
//! ```

use std::fmt;

use async_trait::async_trait;

pub mod error;
pub mod http;
mod wire;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::ClientError;
pub use http::{OpenSearchClient, OpenSearchClientBuilder};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockClient;

// Re-export types for convenience
pub use ostop_types::*;

/// Result of a cluster query.
pub type Result<T> = std::result::Result<T, ClientError>;

/// The named queries a [`ClusterClient`] can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Query {
    ClusterHealth,
    ClusterStats,
    Nodes,
    Indices,
    Shards,
    Allocation,
    ThreadPool,
    Tasks,
    PendingTasks,
    Recovery,
    Segments,
    Fielddata,
    Plugins,
    Templates,
    IndexMapping,
    ClusterActivity,
    ThreadPoolActivity,
}

impl Query {
    /// The queries of a full dashboard refresh, in issue order.
    pub const BATCH: [Query; 14] = [
        Query::ClusterHealth,
        Query::ClusterStats,
        Query::Nodes,
        Query::Indices,
        Query::Shards,
        Query::Allocation,
        Query::ThreadPool,
        Query::Tasks,
        Query::PendingTasks,
        Query::Recovery,
        Query::Segments,
        Query::Fielddata,
        Query::Plugins,
        Query::Templates,
    ];

    /// Human-readable name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Query::ClusterHealth => "cluster health",
            Query::ClusterStats => "cluster stats",
            Query::Nodes => "nodes",
            Query::Indices => "indices",
            Query::Shards => "shards",
            Query::Allocation => "allocation",
            Query::ThreadPool => "thread_pool",
            Query::Tasks => "tasks",
            Query::PendingTasks => "pending_tasks",
            Query::Recovery => "recovery",
            Query::Segments => "segments",
            Query::Fielddata => "fielddata",
            Query::Plugins => "plugins",
            Query::Templates => "templates",
            Query::IndexMapping => "mapping",
            Query::ClusterActivity => "cluster metrics",
            Query::ThreadPoolActivity => "thread pool metrics",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only access to a cluster's monitoring APIs.
///
/// One method per [`Query`]. Implementations are shared behind an `Arc`
/// across concurrently running fetch tasks.
#[async_trait]
pub trait ClusterClient: Send + Sync + fmt::Debug {
    /// Where the client points, for display in the header.
    fn description(&self) -> &str;

    async fn cluster_health(&self) -> Result<ClusterHealth>;
    async fn cluster_stats(&self) -> Result<ClusterStats>;
    async fn nodes(&self) -> Result<Vec<NodeInfo>>;
    async fn indices(&self) -> Result<Vec<IndexInfo>>;
    async fn shards(&self) -> Result<Vec<ShardInfo>>;
    async fn allocation(&self) -> Result<Vec<AllocationInfo>>;
    async fn thread_pool(&self) -> Result<Vec<ThreadPoolInfo>>;
    async fn tasks(&self) -> Result<Vec<TaskInfo>>;
    async fn pending_tasks(&self) -> Result<Vec<PendingTaskInfo>>;
    async fn recovery(&self) -> Result<Vec<RecoveryInfo>>;
    async fn segments(&self) -> Result<Vec<SegmentInfo>>;
    async fn fielddata(&self) -> Result<Vec<FielddataInfo>>;
    async fn plugins(&self) -> Result<Vec<PluginInfo>>;
    async fn templates(&self) -> Result<Vec<TemplateInfo>>;

    /// Mapping of a single index.
    async fn index_mapping(&self, index: &str) -> Result<IndexMapping>;

    /// Cumulative indexing and search totals on primaries.
    async fn activity_totals(&self) -> Result<ActivityTotals>;

    /// Queue depth and cumulative rejections per thread pool, summed over
    /// all nodes.
    async fn thread_pool_totals(&self) -> Result<ThreadPoolTotals>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_order() {
        assert_eq!(Query::BATCH[0], Query::ClusterHealth);
        assert_eq!(Query::BATCH[13], Query::Templates);
        assert!(!Query::BATCH.contains(&Query::IndexMapping));
        assert!(!Query::BATCH.contains(&Query::ClusterActivity));
    }

    #[test]
    fn test_query_display() {
        assert_eq!(Query::PendingTasks.to_string(), "pending_tasks");
        assert_eq!(Query::ClusterActivity.to_string(), "cluster metrics");
    }
}
