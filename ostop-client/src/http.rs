//! HTTP cluster client using the REST monitoring APIs.
//!
//! Every [`Query`] maps to one `GET` request:
//!
//! | Query | Request |
//! |-------|---------|
//! | cluster health / stats | `_cluster/health`, `_cluster/stats` |
//! | listings | `_cat/<api>?format=json&h=<columns>` |
//! | mapping | `<index>/_mapping` |
//! | cluster metrics | `_stats/indexing,search` |
//! | thread pool metrics | `_nodes/stats/thread_pool` |
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use ostop_client::OpenSearchClient;
//!
//! let client = OpenSearchClient::builder()
//!     .endpoint("https://search.internal:9200")
//!     .credentials("admin", "admin")
//!     .insecure(true)
//!     .timeout(Duration::from_secs(10))
//!     .build()
//!     .unwrap();
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::wire;
use crate::{
    ActivityTotals, AllocationInfo, CatRow, ClientError, ClusterClient, ClusterHealth,
    ClusterStats, FielddataInfo, IndexInfo, IndexMapping, NodeInfo, PendingTaskInfo, PluginInfo,
    Query, RecoveryInfo, Result, SegmentInfo, ShardInfo, TaskInfo, TemplateInfo, ThreadPoolInfo,
    ThreadPoolTotals,
};

/// Host suffixes of AWS-managed search domains.
const AWS_SUFFIXES: &[&str] = &[".es.amazonaws.com", ".aoss.amazonaws.com"];

/// Cluster client talking to the REST API over HTTP(S).
#[derive(Debug, Clone)]
pub struct OpenSearchClient {
    client: Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
}

impl OpenSearchClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> OpenSearchClientBuilder {
        OpenSearchClientBuilder::default()
    }

    /// The base URL requests are sent to, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_value(&self, query: Query, path: &str, params: &[(&str, String)]) -> Result<Value> {
        self.get_json(query, path, params).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        query: Query,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.endpoint, path);
        debug!(%query, %url, "sending request");

        let mut request = self.client.get(&url).query(params);
        if let Some(ref username) = self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(query, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                query,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_reqwest(query, e))?;

        wire::decode(query, &body)
    }

    async fn cat<T>(&self, query: Query, api: &str, extra: &[(&str, String)]) -> Result<Vec<T>>
    where
        T: CatRow + DeserializeOwned,
    {
        let mut params = vec![("format", "json".to_string()), ("h", T::COLUMNS.join(","))];
        params.extend_from_slice(extra);
        self.get_json(query, &format!("_cat/{}", api), &params).await
    }
}

#[async_trait]
impl ClusterClient for OpenSearchClient {
    fn description(&self) -> &str {
        &self.endpoint
    }

    async fn cluster_health(&self) -> Result<ClusterHealth> {
        self.get_json(Query::ClusterHealth, "_cluster/health", &[]).await
    }

    async fn cluster_stats(&self) -> Result<ClusterStats> {
        self.get_json(Query::ClusterStats, "_cluster/stats", &[]).await
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>> {
        self.cat(Query::Nodes, "nodes", &[]).await
    }

    async fn indices(&self) -> Result<Vec<IndexInfo>> {
        self.cat(Query::Indices, "indices", &[]).await
    }

    async fn shards(&self) -> Result<Vec<ShardInfo>> {
        self.cat(Query::Shards, "shards", &[]).await
    }

    async fn allocation(&self) -> Result<Vec<AllocationInfo>> {
        self.cat(Query::Allocation, "allocation", &[]).await
    }

    async fn thread_pool(&self) -> Result<Vec<ThreadPoolInfo>> {
        self.cat(Query::ThreadPool, "thread_pool", &[]).await
    }

    async fn tasks(&self) -> Result<Vec<TaskInfo>> {
        self.cat(Query::Tasks, "tasks", &[("detailed", "true".to_string())]).await
    }

    async fn pending_tasks(&self) -> Result<Vec<PendingTaskInfo>> {
        self.cat(Query::PendingTasks, "pending_tasks", &[]).await
    }

    async fn recovery(&self) -> Result<Vec<RecoveryInfo>> {
        self.cat(Query::Recovery, "recovery", &[("active_only", "true".to_string())])
            .await
    }

    async fn segments(&self) -> Result<Vec<SegmentInfo>> {
        self.cat(Query::Segments, "segments", &[]).await
    }

    async fn fielddata(&self) -> Result<Vec<FielddataInfo>> {
        self.cat(Query::Fielddata, "fielddata", &[]).await
    }

    async fn plugins(&self) -> Result<Vec<PluginInfo>> {
        self.cat(Query::Plugins, "plugins", &[]).await
    }

    async fn templates(&self) -> Result<Vec<TemplateInfo>> {
        self.cat(Query::Templates, "templates", &[]).await
    }

    async fn index_mapping(&self, index: &str) -> Result<IndexMapping> {
        let response = self
            .get_value(Query::IndexMapping, &format!("{}/_mapping", index), &[])
            .await?;
        wire::mapping(index, response)
    }

    async fn activity_totals(&self) -> Result<ActivityTotals> {
        let response = self
            .get_value(Query::ClusterActivity, "_stats/indexing,search", &[])
            .await?;
        wire::activity(response)
    }

    async fn thread_pool_totals(&self) -> Result<ThreadPoolTotals> {
        let response = self
            .get_value(Query::ThreadPoolActivity, "_nodes/stats/thread_pool", &[])
            .await?;
        wire::thread_pools(response)
    }
}

/// Whether `endpoint` is an AWS-managed search domain.
pub fn is_aws_endpoint(endpoint: &str) -> bool {
    AWS_SUFFIXES.iter().any(|suffix| endpoint.contains(suffix))
}

/// Builder for [`OpenSearchClient`].
#[derive(Debug, Default)]
pub struct OpenSearchClientBuilder {
    endpoint: Option<String>,
    region: Option<String>,
    profile: Option<String>,
    username: Option<String>,
    password: Option<String>,
    insecure: bool,
    timeout: Option<Duration>,
}

impl OpenSearchClientBuilder {
    /// Set the cluster URL (e.g., "http://localhost:9200").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the AWS region. Required for AWS-managed endpoints.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the AWS profile name.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the username and password for basic authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Skip TLS certificate verification (development clusters only).
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Set the per-request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// Fails with [`ClientError::Config`] when no endpoint is set, when an
    /// AWS-managed endpoint is given without a region, or when the HTTP
    /// client cannot be constructed.
    pub fn build(self) -> Result<OpenSearchClient> {
        let endpoint = self
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ClientError::Config("endpoint is required".to_string()))?;
        let endpoint = endpoint.trim().trim_end_matches('/').to_string();

        if is_aws_endpoint(&endpoint) {
            let Some(region) = self.region.as_deref().filter(|r| !r.is_empty()) else {
                return Err(ClientError::Config(
                    "--region required for AWS OpenSearch endpoints".to_string(),
                ));
            };
            warn!(
                %region,
                profile = self.profile.as_deref().unwrap_or("default"),
                "requests to AWS endpoints are not signed; basic authentication only"
            );
        }

        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(OpenSearchClient {
            client,
            endpoint,
            username: self.username,
            password: self.password,
        })
    }
}
