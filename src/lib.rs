//! # ostop
//!
//! A terminal dashboard for OpenSearch and Elasticsearch clusters, in the
//! spirit of `top`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  UI thread                                                   │
//! │  ┌────────┐ Input ┌─────────┐ Commands ┌───────────┐         │
//! │  │ events │──────▶│   app   │─────────▶│  runtime  │──spawn──┼──▶ fetch
//! │  └────────┘       │ (state) │◀─────────│(EventLoop)│◀─Message┼─── (tokio)
//! │                   └────┬────┘ Messages └───────────┘         │
//! │                        ▼                                     │
//! │                   ┌─────────┐                                │
//! │                   │   ui    │──▶ Terminal                    │
//! │                   └─────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: views, panels, selection and the [`App::update`] state machine
//! - **[`message`]**: inputs, completion messages and background commands
//! - **[`runtime`]**: runs commands on tokio and queues their results
//! - **[`fetch`]**: the batch refresh and live monitor fetches
//! - **[`data`]**: rate time series for the live monitor screens
//! - **[`ui`]**: ratatui rendering and themes
//! - **[`config`]** / **[`logging`]**: settings layering and the log file
//!
//! ## Usage
//!
//! ```bash
//! ostop --endpoint https://localhost:9200 --username admin --password admin --insecure
//! ```
//!
//! Driving the state machine without a terminal:
//!
//! ```
//! use ostop::app::{App, View};
//! use ostop::message::{Command, Input, Message};
//!
//! let mut app = App::new("http://localhost:9200", 12);
//! assert_eq!(app.startup(), vec![Command::FetchCluster]);
//!
//! app.selected_menu_item = View::LiveMetrics.menu_index().unwrap();
//! let commands = app.update(Message::Input(Input::Select));
//! assert_eq!(commands, vec![Command::FetchMetrics, Command::ScheduleMetricsTick(1)]);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod fetch;
pub mod logging;
pub mod message;
pub mod runtime;
pub mod ui;

pub use app::App;
pub use fetch::ClusterData;
pub use runtime::EventLoop;
