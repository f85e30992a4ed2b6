use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use ostop::app::App;
use ostop::config::{Overrides, Settings};
use ostop::events;
use ostop::logging;
use ostop::message::Message;
use ostop::runtime::EventLoop;
use ostop::ui::{self, Theme};
use ostop_client::{ClusterClient, OpenSearchClient};

/// How long to wait for a key before draining background results.
const INPUT_POLL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "ostop", version)]
#[command(about = "Terminal dashboard for OpenSearch and Elasticsearch clusters")]
struct Args {
    /// Cluster URL, e.g. https://localhost:9200
    #[arg(short, long)]
    endpoint: Option<String>,

    /// AWS region, required for Amazon OpenSearch Service endpoints
    #[arg(long)]
    region: Option<String>,

    /// AWS profile
    #[arg(long)]
    profile: Option<String>,

    /// Basic auth username
    #[arg(short, long)]
    username: Option<String>,

    /// Basic auth password
    #[arg(short, long)]
    password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file (default: ostop.log in the temp directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Live monitor polling interval (e.g., "5s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Data points kept by the live monitors
    #[arg(long)]
    history: Option<u64>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            profile: self.profile.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            insecure: self.insecure.then_some(true),
            interval: self.interval.clone(),
            history: self.history,
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    logging::init_logging(&settings.log_file())?;

    let client = build_client(&settings)?;
    let interval = settings.interval()?;

    // Background fetches run on the runtime while the UI owns the main thread
    let rt = tokio::runtime::Runtime::new()?;
    let mut event_loop = EventLoop::new(client.clone(), rt.handle().clone(), interval);
    let mut app =
        App::new(client.description(), settings.history).with_theme(Theme::auto_detect());

    info!(endpoint = client.description(), ?interval, history = settings.history, "starting");
    event_loop.dispatch(app.startup());

    run_tui(&mut app, &mut event_loop)
}

fn build_client(settings: &Settings) -> Result<Arc<dyn ClusterClient>> {
    let mut builder = OpenSearchClient::builder()
        .endpoint(settings.endpoint()?)
        .insecure(settings.insecure)
        .timeout(settings.request_timeout()?);

    if let Some(ref region) = settings.region {
        builder = builder.region(region.clone());
    }
    if let Some(ref profile) = settings.profile {
        builder = builder.profile(profile.clone());
    }
    match (&settings.username, &settings.password) {
        (Some(user), Some(pass)) => builder = builder.credentials(user.clone(), pass.clone()),
        (Some(_), None) | (None, Some(_)) => {
            warn!("username and password must be given together, ignoring credentials")
        }
        (None, None) => {}
    }
    if settings.insecure {
        warn!("TLS certificate verification disabled");
    }

    let client = builder.build().context("Invalid cluster settings")?;
    Ok(Arc::new(client))
}

fn run_tui(app: &mut App, event_loop: &mut EventLoop) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app, event_loop);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_loop: &mut EventLoop,
) -> Result<()> {
    while app.running {
        let mut viewport = ui::Viewport::default();
        terminal.draw(|frame| viewport = ui::render(frame, app))?;
        app.set_viewport(viewport.max_scroll, viewport.page_height);

        if let Some(event) = events::poll_event(INPUT_POLL)? {
            if let Some(input) = events::to_input(&event) {
                event_loop.deliver(app, Message::Input(input));
            }
        }

        event_loop.pump(app);
    }

    Ok(())
}
