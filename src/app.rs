//! Application state and the message-driven state machine.
//!
//! [`App::update`] is the only place state changes. It is called by the event
//! loop with one [`Message`] at a time and returns the background
//! [`Command`]s to run next. Nothing here performs I/O.

use chrono::{DateTime, Utc};
use ostop_client::{ClientError, IndexInfo, IndexMapping};
use tracing::{debug, info, warn};

use crate::data::{MetricsTimeSeries, ThreadPoolTimeSeries};
use crate::fetch::ClusterData;
use crate::message::{Command, Input, Message};
use crate::ui::Theme;

/// The screen shown in the right panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    ClusterOverview,
    Nodes,
    Indices,
    Shards,
    /// Heap, RAM, CPU and disk per node.
    Resources,
    /// Indexing and search throughput, polled on its own ticker.
    LiveMetrics,
    Allocation,
    /// Queue depth and rejections per pool, polled on its own ticker.
    ThreadPoolMonitor,
    Tasks,
    PendingTasks,
    Recovery,
    Segments,
    Fielddata,
    Plugins,
    Templates,
    /// Field tree of one index. Only reachable by drilling into an index.
    IndexSchema,
}

impl View {
    /// Menu entries, in display order.
    pub const MENU: [View; 15] = [
        View::ClusterOverview,
        View::Nodes,
        View::Indices,
        View::Shards,
        View::Resources,
        View::LiveMetrics,
        View::Allocation,
        View::ThreadPoolMonitor,
        View::Tasks,
        View::PendingTasks,
        View::Recovery,
        View::Segments,
        View::Fielddata,
        View::Plugins,
        View::Templates,
    ];

    /// Highest valid menu index.
    pub const LAST_MENU_ITEM: usize = Self::MENU.len() - 1;

    pub fn from_menu_index(index: usize) -> Option<View> {
        Self::MENU.get(index).copied()
    }

    /// Position in the menu, `None` for drill-down screens.
    pub fn menu_index(self) -> Option<usize> {
        Self::MENU.iter().position(|v| *v == self)
    }

    /// Returns the display label for this view.
    pub fn label(self) -> &'static str {
        match self {
            View::ClusterOverview => "Cluster Overview",
            View::Nodes => "Nodes",
            View::Indices => "Indices",
            View::Shards => "Shards",
            View::Resources => "Resources",
            View::LiveMetrics => "Live Metrics",
            View::Allocation => "Allocation",
            View::ThreadPoolMonitor => "Thread Pools",
            View::Tasks => "Tasks",
            View::PendingTasks => "Pending Tasks",
            View::Recovery => "Recovery",
            View::Segments => "Segments",
            View::Fielddata => "Fielddata",
            View::Plugins => "Plugins",
            View::Templates => "Templates",
            View::IndexSchema => "Index Schema",
        }
    }
}

/// Which panel receives directional input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// The navigation menu.
    Left,
    /// The content of the current view.
    Right,
}

/// Coarse state derived from the loading and error flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Loading,
    Error,
    Ready,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    /// Where the client points, for the header.
    pub endpoint: String,

    // Navigation
    pub current_view: View,
    pub active_panel: Panel,
    pub selected_menu_item: usize,
    pub selected_node: usize,
    pub selected_index_entry: usize,
    pub selected_index_name: Option<String>,
    pub index_mapping: Option<IndexMapping>,

    // Right panel viewport, as last reported by the renderer
    pub scroll: usize,
    scroll_limit: usize,
    page_height: usize,

    // Fetches the user waits on
    /// A batch refresh or a mapping drill-down is in flight.
    pub loading: bool,
    refresh_pending: bool,
    /// Index whose mapping fetch is outstanding.
    mapping_pending: Option<String>,
    pub error: Option<ClientError>,
    pub data: Option<ClusterData>,

    // Live monitors
    pub metrics: MetricsTimeSeries,
    pub metrics_enabled: bool,
    pub metrics_updated_at: Option<DateTime<Utc>>,
    /// Bumped each time live metrics start; ticks of older generations die.
    metrics_generation: u64,
    pub thread_pools: ThreadPoolTimeSeries,
    pub thread_pool_enabled: bool,
    pub thread_pool_updated_at: Option<DateTime<Utc>>,
    thread_pool_generation: u64,

    // UI
    pub theme: Theme,
}

impl App {
    /// Create the initial state. `history` is the window size of both live
    /// monitors.
    pub fn new(endpoint: impl Into<String>, history: usize) -> Self {
        Self {
            running: true,
            show_help: false,
            endpoint: endpoint.into(),
            current_view: View::ClusterOverview,
            active_panel: Panel::Left,
            selected_menu_item: 0,
            selected_node: 0,
            selected_index_entry: 0,
            selected_index_name: None,
            index_mapping: None,
            scroll: 0,
            scroll_limit: 0,
            page_height: 1,
            loading: true,
            refresh_pending: true,
            mapping_pending: None,
            error: None,
            data: None,
            metrics: MetricsTimeSeries::new(history),
            metrics_enabled: false,
            metrics_updated_at: None,
            metrics_generation: 0,
            thread_pools: ThreadPoolTimeSeries::new(history),
            thread_pool_enabled: false,
            thread_pool_updated_at: None,
            thread_pool_generation: 0,
            theme: Theme::dark(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Commands to run once at startup: the initial batch fetch.
    pub fn startup(&mut self) -> Vec<Command> {
        self.refresh_pending = true;
        self.sync_loading();
        vec![Command::FetchCluster]
    }

    pub fn status(&self) -> Status {
        if self.loading {
            Status::Loading
        } else if self.error.is_some() {
            Status::Error
        } else {
            Status::Ready
        }
    }

    /// Whether the mapping of the schema on screen is still being fetched.
    pub fn mapping_in_flight(&self) -> bool {
        self.mapping_pending.is_some()
            && self.mapping_pending == self.selected_index_name
    }

    fn sync_loading(&mut self) {
        self.loading = self.refresh_pending || self.mapping_pending.is_some();
    }

    /// Indices from the last successful refresh.
    pub fn indices(&self) -> &[IndexInfo] {
        self.data.as_ref().map(|d| d.indices.as_slice()).unwrap_or_default()
    }

    /// Record the size of the right panel from the last draw and clamp the
    /// scroll offset to it.
    pub fn set_viewport(&mut self, max_scroll: usize, page_height: usize) {
        self.scroll_limit = max_scroll;
        self.page_height = page_height.max(1);
        self.scroll = self.scroll.min(max_scroll);
    }

    /// Apply one message and return the background work it requests.
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::Input(input) => self.handle_input(input),
            Message::Refresh(result) => {
                self.apply_refresh(result);
                Vec::new()
            }
            Message::Mapping { index, result } => {
                self.apply_mapping(index, result);
                Vec::new()
            }
            Message::MetricsTick(generation) => {
                if self.metrics_enabled && generation == self.metrics_generation {
                    vec![Command::FetchMetrics, Command::ScheduleMetricsTick(generation)]
                } else {
                    debug!(generation, "live metrics ticker stopped");
                    Vec::new()
                }
            }
            Message::Metrics(Ok(snapshot)) => {
                let timestamp = snapshot.timestamp;
                if self.metrics.add_snapshot(snapshot) {
                    self.metrics_updated_at = Some(timestamp);
                }
                Vec::new()
            }
            Message::Metrics(Err(e)) => {
                warn!(error = %e, "live metrics fetch failed");
                Vec::new()
            }
            Message::ThreadPoolTick(generation) => {
                if self.thread_pool_enabled && generation == self.thread_pool_generation {
                    vec![
                        Command::FetchThreadPools,
                        Command::ScheduleThreadPoolTick(generation),
                    ]
                } else {
                    debug!(generation, "thread pool ticker stopped");
                    Vec::new()
                }
            }
            Message::ThreadPools(Ok(snapshot)) => {
                let timestamp = snapshot.timestamp;
                if self.thread_pools.add_snapshot(snapshot) {
                    self.thread_pool_updated_at = Some(timestamp);
                }
                Vec::new()
            }
            Message::ThreadPools(Err(e)) => {
                warn!(error = %e, "thread pool metrics fetch failed");
                Vec::new()
            }
        }
    }

    fn handle_input(&mut self, input: Input) -> Vec<Command> {
        // Any key closes the help overlay
        if self.show_help && input != Input::Quit {
            self.show_help = false;
            return Vec::new();
        }

        match input {
            Input::Quit => self.running = false,
            Input::ToggleHelp => self.show_help = !self.show_help,
            Input::Refresh => {
                self.error = None;
                self.refresh_pending = true;
                self.sync_loading();
                return vec![Command::FetchCluster];
            }
            Input::TogglePanel => {
                self.active_panel = match self.active_panel {
                    Panel::Left => Panel::Right,
                    Panel::Right => Panel::Left,
                };
            }
            Input::Up | Input::Down if self.active_panel == Panel::Left => {
                return self.move_menu(input == Input::Down);
            }
            Input::Select if self.active_panel == Panel::Left => {
                let commands = self.apply_menu_selection();
                self.active_panel = Panel::Right;
                return commands;
            }
            Input::Select => return self.drill_down(),
            Input::Back => self.leave_schema(),
            Input::Up | Input::Down | Input::PageUp | Input::PageDown | Input::Home | Input::End
                if self.active_panel == Panel::Right =>
            {
                if self.current_view == View::Indices {
                    self.move_index_cursor(input);
                } else {
                    self.scroll_viewport(input);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    /// Move the menu cursor one step, previewing the new screen.
    fn move_menu(&mut self, down: bool) -> Vec<Command> {
        let next = if down {
            (self.selected_menu_item + 1).min(View::LAST_MENU_ITEM)
        } else {
            self.selected_menu_item.saturating_sub(1)
        };
        if next == self.selected_menu_item {
            return Vec::new();
        }
        self.selected_menu_item = next;
        self.apply_menu_selection()
    }

    /// Switch to the screen under the menu cursor and start or stop the
    /// live monitors accordingly.
    fn apply_menu_selection(&mut self) -> Vec<Command> {
        let Some(view) = View::from_menu_index(self.selected_menu_item) else {
            return Vec::new();
        };

        self.current_view = view;
        self.selected_node = 0;
        self.selected_index_entry = 0;
        self.selected_index_name = None;
        self.index_mapping = None;
        self.mapping_pending = None;
        self.sync_loading();
        self.scroll = 0;

        let mut commands = Vec::new();

        let metrics_enabled = view == View::LiveMetrics;
        if metrics_enabled && !self.metrics_enabled {
            self.metrics_generation += 1;
            info!(generation = self.metrics_generation, "starting live metrics");
            commands.extend([
                Command::FetchMetrics,
                Command::ScheduleMetricsTick(self.metrics_generation),
            ]);
        }
        self.metrics_enabled = metrics_enabled;

        let thread_pool_enabled = view == View::ThreadPoolMonitor;
        if thread_pool_enabled && !self.thread_pool_enabled {
            self.thread_pool_generation += 1;
            info!(generation = self.thread_pool_generation, "starting thread pool monitor");
            commands.extend([
                Command::FetchThreadPools,
                Command::ScheduleThreadPoolTick(self.thread_pool_generation),
            ]);
        }
        self.thread_pool_enabled = thread_pool_enabled;

        commands
    }

    /// Open the schema of the index under the cursor.
    fn drill_down(&mut self) -> Vec<Command> {
        if self.current_view != View::Indices {
            return Vec::new();
        }
        let Some(index) = self.indices().get(self.selected_index_entry) else {
            return Vec::new();
        };

        let name = index.index.clone();
        debug!(index = %name, "drilling into index schema");
        self.selected_index_name = Some(name.clone());
        self.index_mapping = None;
        self.current_view = View::IndexSchema;
        self.scroll = 0;
        self.mapping_pending = Some(name.clone());
        self.sync_loading();
        vec![Command::FetchMapping(name)]
    }

    fn leave_schema(&mut self) {
        if self.current_view != View::IndexSchema {
            return;
        }
        self.current_view = View::Indices;
        self.selected_index_name = None;
        self.index_mapping = None;
        self.mapping_pending = None;
        self.sync_loading();
        self.scroll = 0;
    }

    fn move_index_cursor(&mut self, input: Input) {
        let len = self.indices().len();
        if len == 0 {
            return;
        }
        let last = len - 1;
        let cursor = self.selected_index_entry;
        self.selected_index_entry = match input {
            Input::Up => cursor.saturating_sub(1),
            Input::Down => (cursor + 1).min(last),
            Input::PageUp => cursor.saturating_sub(self.page_height),
            Input::PageDown => (cursor + self.page_height).min(last),
            Input::Home => 0,
            Input::End => last,
            _ => cursor,
        };
    }

    fn scroll_viewport(&mut self, input: Input) {
        let scroll = self.scroll;
        self.scroll = match input {
            Input::Up => scroll.saturating_sub(1),
            Input::Down => scroll + 1,
            Input::PageUp => scroll.saturating_sub(self.page_height),
            Input::PageDown => scroll + self.page_height,
            Input::Home => 0,
            Input::End => self.scroll_limit,
            _ => scroll,
        }
        .min(self.scroll_limit);
    }

    fn apply_refresh(&mut self, result: Result<ClusterData, ClientError>) {
        self.refresh_pending = false;
        self.sync_loading();
        match result {
            Ok(data) => {
                self.error = None;
                let len = data.indices.len();
                self.selected_index_entry = self.selected_index_entry.min(len.saturating_sub(1));
                self.data = Some(data);
            }
            Err(e) => {
                warn!(error = %e, "cluster refresh failed");
                self.error = Some(e);
            }
        }
    }

    fn apply_mapping(&mut self, index: String, result: Result<IndexMapping, ClientError>) {
        if self.mapping_pending.as_deref() == Some(index.as_str()) {
            self.mapping_pending = None;
            self.sync_loading();
        }
        let current = self.current_view == View::IndexSchema
            && self.selected_index_name.as_deref() == Some(index.as_str());
        if !current {
            debug!(%index, "discarding mapping for a schema no longer shown");
            return;
        }

        match result {
            Ok(mapping) => {
                self.error = None;
                self.index_mapping = Some(mapping);
            }
            Err(e) => {
                warn!(%index, error = %e, "mapping fetch failed");
                self.index_mapping = None;
                self.error = Some(e);
            }
        }
    }
}
