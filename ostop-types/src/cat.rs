//! Row types of the `_cat` listing APIs.
//!
//! Every row type implements [`CatRow`], which names the columns to request
//! through the `h=` query parameter. The column list and the serde renames
//! come from the same declaration so they cannot drift apart.

use serde::{Deserialize, Serialize};

/// A row of a `_cat/*?format=json` listing.
pub trait CatRow {
    /// Column names, in request order.
    const COLUMNS: &'static [&'static str];
}

macro_rules! cat_row {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* $field:ident => $column:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(rename = $column, default, deserialize_with = "crate::nullable")]
                pub $field: String,
            )+
        }

        impl CatRow for $name {
            const COLUMNS: &'static [&'static str] = &[$($column),+];
        }
    };
}

cat_row! {
    /// A node from `_cat/nodes`.
    pub struct NodeInfo {
        ip => "ip",
        heap_percent => "heap.percent",
        ram_percent => "ram.percent",
        cpu => "cpu",
        load_1m => "load_1m",
        load_5m => "load_5m",
        load_15m => "load_15m",
        /// Role letters, e.g. `dimr`.
        node_role => "node.role",
        /// `*` on the elected cluster manager.
        master => "master",
        name => "name",
        disk_used_percent => "disk.used_percent",
        disk_used => "disk.used",
        disk_avail => "disk.avail",
        disk_total => "disk.total",
    }
}

impl NodeInfo {
    /// Whether this node is the elected cluster manager.
    pub fn is_master(&self) -> bool {
        self.master == "*"
    }
}

cat_row! {
    /// An index from `_cat/indices`.
    pub struct IndexInfo {
        health => "health",
        status => "status",
        index => "index",
        uuid => "uuid",
        pri => "pri",
        rep => "rep",
        docs_count => "docs.count",
        docs_deleted => "docs.deleted",
        store_size => "store.size",
        pri_store_size => "pri.store.size",
    }
}

cat_row! {
    /// A shard copy from `_cat/shards`.
    pub struct ShardInfo {
        index => "index",
        shard => "shard",
        /// `p` for primary, `r` for replica.
        prirep => "prirep",
        /// `STARTED`, `RELOCATING`, `INITIALIZING` or `UNASSIGNED`.
        state => "state",
        docs => "docs",
        store => "store",
        ip => "ip",
        node => "node",
    }
}

impl ShardInfo {
    pub fn is_primary(&self) -> bool {
        self.prirep == "p"
    }
}

cat_row! {
    /// Disk allocation of one node from `_cat/allocation`.
    pub struct AllocationInfo {
        shards => "shards",
        disk_indices => "disk.indices",
        disk_used => "disk.used",
        disk_avail => "disk.avail",
        disk_total => "disk.total",
        disk_percent => "disk.percent",
        host => "host",
        ip => "ip",
        node => "node",
    }
}

cat_row! {
    /// One pool on one node from `_cat/thread_pool`.
    pub struct ThreadPoolInfo {
        node_name => "node_name",
        name => "name",
        active => "active",
        queue => "queue",
        rejected => "rejected",
        completed => "completed",
        size => "size",
    }
}

cat_row! {
    /// A running task from `_cat/tasks`.
    pub struct TaskInfo {
        action => "action",
        task_id => "task_id",
        parent_task_id => "parent_task_id",
        kind => "type",
        start_time => "start_time",
        timestamp => "timestamp",
        running_time => "running_time",
        ip => "ip",
        node => "node",
        description => "description",
    }
}

cat_row! {
    /// A queued cluster-state update from `_cat/pending_tasks`.
    pub struct PendingTaskInfo {
        insert_order => "insertOrder",
        time_in_queue => "timeInQueue",
        priority => "priority",
        source => "source",
    }
}

cat_row! {
    /// An active shard recovery from `_cat/recovery`.
    pub struct RecoveryInfo {
        index => "index",
        shard => "shard",
        time => "time",
        kind => "type",
        stage => "stage",
        source_node => "source_node",
        target_node => "target_node",
        files => "files",
        files_recovered => "files_recovered",
        files_percent => "files_percent",
        bytes => "bytes",
        bytes_recovered => "bytes_recovered",
        bytes_percent => "bytes_percent",
    }
}

cat_row! {
    /// A Lucene segment from `_cat/segments`.
    pub struct SegmentInfo {
        index => "index",
        shard => "shard",
        prirep => "prirep",
        ip => "ip",
        segment => "segment",
        generation => "generation",
        docs_count => "docs.count",
        docs_deleted => "docs.deleted",
        size => "size",
        committed => "committed",
    }
}

cat_row! {
    /// Fielddata cache usage of one field on one node from `_cat/fielddata`.
    pub struct FielddataInfo {
        id => "id",
        host => "host",
        ip => "ip",
        node => "node",
        field => "field",
        size => "size",
    }
}

cat_row! {
    /// An installed plugin from `_cat/plugins`.
    pub struct PluginInfo {
        id => "id",
        name => "name",
        component => "component",
        version => "version",
        description => "description",
    }
}

cat_row! {
    /// An index template from `_cat/templates`.
    pub struct TemplateInfo {
        name => "name",
        index_patterns => "index_patterns",
        order => "order",
        version => "version",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_match_renames() {
        assert_eq!(PendingTaskInfo::COLUMNS, &["insertOrder", "timeInQueue", "priority", "source"]);
        assert_eq!(ShardInfo::COLUMNS.len(), 8);
        assert!(TaskInfo::COLUMNS.contains(&"type"));
    }

    #[test]
    fn test_deserialize_nodes_with_nulls() {
        let json = r#"[
            {"ip":"10.0.0.1","heap.percent":"55","node.role":"dimr","master":"*","name":"n1","disk.used_percent":"12.5"},
            {"ip":"10.0.0.2","heap.percent":null,"node.role":"m","master":"-","name":"n2","disk.used_percent":null}
        ]"#;

        let nodes: Vec<NodeInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].is_master());
        assert!(!nodes[1].is_master());
        assert_eq!(nodes[1].heap_percent, "");
        // Columns not in the payload default to empty.
        assert_eq!(nodes[0].load_15m, "");
    }

    #[test]
    fn test_deserialize_tasks_type_column() {
        let json = r#"[{"action":"indices:data/write/bulk","task_id":"abc:1","type":"transport","running_time":"1.2ms"}]"#;
        let tasks: Vec<TaskInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(tasks[0].kind, "transport");
        assert_eq!(tasks[0].running_time, "1.2ms");
    }

    #[test]
    fn test_shard_is_primary() {
        let shard = ShardInfo {
            prirep: "p".to_string(),
            ..Default::default()
        };
        assert!(shard.is_primary());
    }
}
