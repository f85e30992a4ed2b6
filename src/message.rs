//! Messages consumed by the state machine and the commands it emits.

use ostop_client::{ClientError, IndexMapping};

use crate::data::{MetricsSnapshot, ThreadPoolSnapshot};
use crate::fetch::ClusterData;

/// A user action, already decoded from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    /// Confirm the current selection (Enter).
    Select,
    /// Leave a drill-down (Esc / Backspace).
    Back,
    /// Switch between the menu and the content panel.
    TogglePanel,
    /// Manual refresh.
    Refresh,
    ToggleHelp,
    Quit,
}

/// Everything that can change [`App`](crate::app::App) state.
///
/// Each message is delivered exactly once, in the order it reached the event
/// loop.
#[derive(Debug)]
pub enum Message {
    Input(Input),
    /// Result of a batch refresh.
    Refresh(Result<ClusterData, ClientError>),
    /// Result of a mapping drill-down for the named index.
    Mapping {
        index: String,
        result: Result<IndexMapping, ClientError>,
    },
    /// The live metrics ticker of the given generation fired.
    MetricsTick(u64),
    Metrics(Result<MetricsSnapshot, ClientError>),
    /// The thread pool ticker of the given generation fired.
    ThreadPoolTick(u64),
    ThreadPools(Result<ThreadPoolSnapshot, ClientError>),
}

/// Background work requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchCluster,
    FetchMapping(String),
    FetchMetrics,
    FetchThreadPools,
    /// Deliver [`Message::MetricsTick`] with this generation after one
    /// interval.
    ScheduleMetricsTick(u64),
    /// Deliver [`Message::ThreadPoolTick`] with this generation after one
    /// interval.
    ScheduleThreadPoolTick(u64),
}
