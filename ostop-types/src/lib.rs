//! # ostop-types
//!
//! Data model for the monitoring payloads that `ostop` reads from an
//! OpenSearch (or Elasticsearch compatible) cluster.
//!
//! The types follow the wire format of the cluster APIs closely:
//!
//! - [`ClusterHealth`] and [`ClusterStats`] mirror `_cluster/health` and
//!   `_cluster/stats`.
//! - The `cat` row types ([`NodeInfo`], [`IndexInfo`], [`ShardInfo`], ...)
//!   mirror the `_cat/*?format=json` listings. The cat APIs report every
//!   column as a string (sizes like `"1.2gb"`, percentages like `"42"`), so
//!   those fields stay strings here; `null` columns decode as empty strings.
//! - [`IndexMapping`] holds the raw mapping of one index and can flatten it
//!   into a [`FieldInfo`] tree.
//! - [`ActivityTotals`] and [`ThreadPoolTotals`] are the cumulative counters
//!   that feed the live monitors.
//!
//! ## Example
//!
//! ```rust
//! use ostop_types::NodeInfo;
//!
//! let json = r#"[{"name":"node-1","ip":"10.0.0.1","heap.percent":"41","disk.used_percent":null}]"#;
//! let nodes: Vec<NodeInfo> = serde_json::from_str(json).unwrap();
//!
//! assert_eq!(nodes[0].name, "node-1");
//! assert_eq!(nodes[0].heap_percent, "41");
//! assert_eq!(nodes[0].disk_used_percent, "");
//! ```

mod activity;
mod cat;
mod cluster;
mod mapping;

pub use activity::*;
pub use cat::*;
pub use cluster::*;
pub use mapping::*;

use serde::{Deserialize, Deserializer};

/// Decode a string column that the cat APIs may report as `null`.
pub(crate) fn nullable<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
