//! Error types for cluster queries.

use thiserror::Error;

use crate::Query;

/// Errors that can occur when querying the cluster.
///
/// Every variant except [`ClientError::Config`] names the query that failed.
/// Callers generally treat all variants the same way ("the fetch failed");
/// the distinction exists for logs and for the error banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, refused, TLS, reset).
    #[error("{query} request failed: {message}")]
    Connection { query: Query, message: String },

    /// The HTTP client's own request timeout elapsed.
    #[error("{query} request timed out")]
    Timeout { query: Query },

    /// The cluster answered with a non-success status.
    #[error("{query} API error: {status}")]
    Status { query: Query, status: u16 },

    /// The response body could not be decoded.
    #[error("failed to parse {query}: {message}")]
    Parse { query: Query, message: String },

    /// The client could not be constructed from the given settings.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify a reqwest failure for the given query.
    pub fn from_reqwest(query: Query, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout { query }
        } else if err.is_decode() {
            ClientError::Parse {
                query,
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            ClientError::Status {
                query,
                status: status.as_u16(),
            }
        } else {
            ClientError::Connection {
                query,
                message: err.to_string(),
            }
        }
    }

    /// The query that failed, if the error came from a query.
    pub fn query(&self) -> Option<Query> {
        match self {
            ClientError::Connection { query, .. }
            | ClientError::Timeout { query }
            | ClientError::Status { query, .. }
            | ClientError::Parse { query, .. } => Some(*query),
            ClientError::Config(_) => None,
        }
    }
}
