//! Event loop adapter between the state machine and tokio.
//!
//! [`EventLoop`] turns each [`Command`] into a spawned task that performs its
//! I/O and sends exactly one [`Message`] back over an unbounded channel. The
//! owner of the loop (the UI thread) drains that channel and feeds messages to
//! [`App::update`] one at a time, so state is never touched concurrently.
//!
//! ```text
//!  UI thread                         tokio workers
//!  ─────────                         ─────────────
//!  App::update(msg) ──Commands──▶ dispatch() ──spawn──▶ fetch / sleep
//!        ▲                                                  │
//!        └──────────── try_next() ◀── mpsc ◀── Message ─────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use ostop_client::ClusterClient;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::App;
use crate::fetch;
use crate::message::{Command, Message};

/// Runs background commands and queues their completion messages.
pub struct EventLoop {
    client: Arc<dyn ClusterClient>,
    handle: Handle,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    tick_interval: Duration,
}

impl EventLoop {
    /// Create a loop spawning onto `handle`. Live monitor ticks fire every
    /// `tick_interval`.
    pub fn new(client: Arc<dyn ClusterClient>, handle: Handle, tick_interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            handle,
            tx,
            rx,
            tick_interval,
        }
    }

    /// A sender for injecting messages from outside the loop.
    pub fn sender(&self) -> mpsc::UnboundedSender<Message> {
        self.tx.clone()
    }

    /// Spawn one task per command.
    pub fn dispatch(&self, commands: Vec<Command>) {
        for command in commands {
            self.spawn(command);
        }
    }

    fn spawn(&self, command: Command) {
        debug!(?command, "dispatching");
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let interval = self.tick_interval;

        self.handle.spawn(async move {
            let message = match command {
                Command::FetchCluster => Message::Refresh(fetch::fetch_cluster(&*client).await),
                Command::FetchMapping(index) => {
                    let result = fetch::fetch_mapping(&*client, &index).await;
                    Message::Mapping { index, result }
                }
                Command::FetchMetrics => Message::Metrics(fetch::fetch_metrics(&*client).await),
                Command::FetchThreadPools => {
                    Message::ThreadPools(fetch::fetch_thread_pools(&*client).await)
                }
                Command::ScheduleMetricsTick(generation) => {
                    tokio::time::sleep(interval).await;
                    Message::MetricsTick(generation)
                }
                Command::ScheduleThreadPoolTick(generation) => {
                    tokio::time::sleep(interval).await;
                    Message::ThreadPoolTick(generation)
                }
            };

            if tx.send(message).is_err() {
                debug!("event loop closed, dropping result");
            }
        });
    }

    /// Take the next queued message without waiting.
    pub fn try_next(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next message.
    pub async fn next(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Apply one message to `app` and dispatch the resulting commands.
    pub fn deliver(&self, app: &mut App, message: Message) {
        let commands = app.update(message);
        self.dispatch(commands);
    }

    /// Deliver every message queued so far. Returns how many were applied.
    pub fn pump(&mut self, app: &mut App) -> usize {
        let mut delivered = 0;
        while let Some(message) = self.try_next() {
            self.deliver(app, message);
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Panel, Status, View};
    use crate::message::Input;
    use ostop_client::{MockClient, Query};

    const INTERVAL: Duration = Duration::from_secs(5);

    fn event_loop(client: Arc<MockClient>) -> EventLoop {
        EventLoop::new(client, Handle::current(), INTERVAL)
    }

    fn kind(message: &Message) -> &'static str {
        match message {
            Message::Input(_) => "input",
            Message::Refresh(_) => "refresh",
            Message::Mapping { .. } => "mapping",
            Message::MetricsTick(_) => "metrics tick",
            Message::Metrics(_) => "metrics",
            Message::ThreadPoolTick(_) => "thread pool tick",
            Message::ThreadPools(_) => "thread pools",
        }
    }

    /// Wait for the next message, apply it, and report what it was.
    async fn deliver_next(lp: &mut EventLoop, app: &mut App) -> &'static str {
        let message = tokio::time::timeout(Duration::from_secs(30), lp.next())
            .await
            .expect("no message within timeout")
            .expect("channel closed");
        let kind = kind(&message);
        lp.deliver(app, message);
        kind
    }

    #[tokio::test]
    async fn test_startup_refresh_round_trip() {
        let client = Arc::new(MockClient::with_fixtures());
        let mut lp = event_loop(client.clone());
        let mut app = App::new(client.description(), 12);

        lp.dispatch(app.startup());
        let message = lp.next().await.unwrap();
        assert!(matches!(message, Message::Refresh(Ok(_))));
        lp.deliver(&mut app, message);

        assert_eq!(app.status(), Status::Ready);
        assert_eq!(app.indices().len(), 3);
        assert_eq!(client.total_calls(), Query::BATCH.len());
    }

    #[tokio::test]
    async fn test_failed_startup_surfaces_error() {
        let client = Arc::new(MockClient::with_fixtures());
        client.fail(Query::Indices);
        let mut lp = event_loop(client.clone());
        let mut app = App::new(client.description(), 12);

        lp.dispatch(app.startup());
        let message = lp.next().await.unwrap();
        lp.deliver(&mut app, message);

        assert_eq!(app.status(), Status::Error);
        assert!(app.data.is_none());
        assert_eq!(client.call_count(Query::Shards), 0);
    }

    #[tokio::test]
    async fn test_drill_down_round_trip() {
        let client = Arc::new(MockClient::with_fixtures());
        let mut lp = event_loop(client.clone());
        let mut app = App::new(client.description(), 12);

        lp.dispatch(app.startup());
        deliver_next(&mut lp, &mut app).await;

        app.selected_menu_item = View::Indices.menu_index().unwrap();
        lp.deliver(&mut app, Message::Input(Input::Select));
        lp.deliver(&mut app, Message::Input(Input::Select));
        assert_eq!(app.current_view, View::IndexSchema);

        assert_eq!(deliver_next(&mut lp, &mut app).await, "mapping");
        assert!(!app.loading);
        let mapping = app.index_mapping.as_ref().unwrap();
        assert_eq!(mapping.index_name, "logs-2024");
        assert_eq!(client.call_count(Query::IndexMapping), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_metrics_ticker_lifecycle() {
        let client = Arc::new(MockClient::with_fixtures());
        let mut lp = event_loop(client.clone());
        let mut app = App::new(client.description(), 12);

        app.selected_menu_item = View::LiveMetrics.menu_index().unwrap();
        lp.deliver(&mut app, Message::Input(Input::Select));
        assert_eq!(app.active_panel, Panel::Right);

        // Immediate fetch, then the tick one interval later.
        assert_eq!(deliver_next(&mut lp, &mut app).await, "metrics");
        assert_eq!(deliver_next(&mut lp, &mut app).await, "metrics tick");
        assert_eq!(client.call_count(Query::ClusterActivity), 1);

        // The tick scheduled a fetch and the following tick.
        assert_eq!(deliver_next(&mut lp, &mut app).await, "metrics");
        assert_eq!(client.call_count(Query::ClusterActivity), 2);

        // Navigate away: the pending tick arrives and is not renewed.
        lp.deliver(&mut app, Message::Input(Input::TogglePanel));
        lp.deliver(&mut app, Message::Input(Input::Up));
        assert!(!app.metrics_enabled);
        assert_eq!(deliver_next(&mut lp, &mut app).await, "metrics tick");

        let idle = tokio::time::timeout(INTERVAL * 4, lp.next()).await;
        assert!(idle.is_err(), "ticker kept running after leaving the view");
        assert_eq!(client.call_count(Query::ClusterActivity), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_menu_preview_across_live_metrics_keeps_one_ticker() {
        let client = Arc::new(MockClient::with_fixtures());
        let mut lp = event_loop(client.clone());
        let mut app = App::new(client.description(), 12);

        // Scroll the menu across Live Metrics and back before its first tick.
        app.selected_menu_item = View::Resources.menu_index().unwrap();
        lp.deliver(&mut app, Message::Input(Input::Down));
        lp.deliver(&mut app, Message::Input(Input::Down));
        lp.deliver(&mut app, Message::Input(Input::Up));
        assert_eq!(app.current_view, View::LiveMetrics);

        let deadline = tokio::time::Instant::now() + INTERVAL * 12;
        while let Ok(Some(message)) = tokio::time::timeout_at(deadline, lp.next()).await {
            lp.deliver(&mut app, message);
        }

        // Two immediate fetches, then one per interval from a single ticker.
        let calls = client.call_count(Query::ClusterActivity);
        assert!((13..=14).contains(&calls), "{} fetches in 60s", calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_metrics_errors_keep_ticker_alive() {
        let client = Arc::new(MockClient::with_fixtures());
        client.fail(Query::ClusterActivity);
        let mut lp = event_loop(client.clone());
        let mut app = App::new(client.description(), 12);

        app.selected_menu_item = View::LiveMetrics.menu_index().unwrap();
        lp.deliver(&mut app, Message::Input(Input::Select));

        for _ in 0..3 {
            assert_eq!(deliver_next(&mut lp, &mut app).await, "metrics");
            assert_eq!(deliver_next(&mut lp, &mut app).await, "metrics tick");
        }
        assert!(app.metrics_enabled);
        assert!(app.error.is_none());
        assert_eq!(client.call_count(Query::ClusterActivity), 3);
    }

    #[tokio::test]
    async fn test_pump_drains_queue() {
        let client = Arc::new(MockClient::with_fixtures());
        let mut lp = event_loop(client.clone());
        let mut app = App::new(client.description(), 12);

        let tx = lp.sender();
        tx.send(Message::Input(Input::Down)).unwrap();
        tx.send(Message::Input(Input::Down)).unwrap();
        tx.send(Message::Input(Input::ToggleHelp)).unwrap();

        assert_eq!(lp.pump(&mut app), 3);
        assert_eq!(app.selected_menu_item, 2);
        assert!(app.show_help);
        assert_eq!(lp.pump(&mut app), 0);
    }
}
