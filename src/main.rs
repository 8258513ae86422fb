use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use nodewatch::app::{App, View};
use nodewatch::config::Settings;
use nodewatch::data::Inventory;
use nodewatch::source::{DataSource, FileSource, HttpSource};
use nodewatch::ui::{self, Theme};
use nodewatch::{events, logging};
use nodewatch_client::MonitoringClient;

#[derive(Parser, Debug)]
#[command(name = "nodewatch")]
#[command(about = "Terminal dashboard for application-server fleet health")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the system health API
    #[arg(long, conflicts_with = "fixture")]
    endpoint: Option<String>,

    /// Serve requests from a fixture JSON file instead of the API
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Node/application inventory JSON for the Applications view
    #[arg(short, long)]
    inventory: Option<PathBuf>,

    /// Time range: 1h, 6h, 24h or all
    #[arg(long)]
    range: Option<String>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Export the derived state to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint.clone() {
        settings.api.base_url = endpoint;
    }
    if let Some(range) = args.range.clone() {
        settings.dashboard.range = range;
    }
    if let Some(refresh) = args.refresh {
        settings.dashboard.refresh_secs = refresh;
    }
    if let Some(inventory) = args.inventory.clone() {
        settings.dashboard.inventory = Some(inventory);
    }

    // The TUI owns the terminal, so it logs to a file
    let logged = if args.export.is_some() {
        logging::init_stderr_logging(&settings.logging)
    } else {
        logging::init_file_logging(&settings.logging)
    };
    if let Err(e) = logged {
        eprintln!("Logging disabled: {:#}", e);
    }

    let inventory = match settings.dashboard.inventory.as_deref() {
        Some(path) => Inventory::load(path, &settings.thresholds)?,
        None => Inventory::default(),
    };

    // Kept alive for the whole run; the HTTP source spawns onto it
    let rt = Runtime::new().context("starting tokio runtime")?;
    let source = build_source(&args, &settings, &rt)?;
    info!(source = source.description(), range = %settings.range_token(), "Starting");

    if let Some(export_path) = args.export {
        let app = App::new(
            source,
            settings.thresholds.clone(),
            settings.range_token(),
            inventory,
            Theme::dark(),
        );
        return export_to_file(app, &export_path, settings.request_timeout());
    }

    let app = App::new(
        source,
        settings.thresholds.clone(),
        settings.range_token(),
        inventory,
        Theme::auto_detect(),
    );
    run_tui(app, settings.refresh_interval())
}

fn build_source(args: &Args, settings: &Settings, rt: &Runtime) -> Result<Box<dyn DataSource>> {
    if let Some(path) = &args.fixture {
        return Ok(Box::new(FileSource::new(path)));
    }
    let client = MonitoringClient::builder()
        .endpoint(settings.api.base_url.clone())
        .timeout(settings.request_timeout())
        .build()
        .context("building API client")?;
    Ok(Box::new(HttpSource::new(client, rt.handle().clone())))
}

/// Run the TUI until the user quits
fn run_tui(mut app: App, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    app.refresh();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        app.poll_responses();

        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Nodes => ui::nodes::render(frame, app, chunks[2]),
                View::Applications => ui::applications::render(frame, app, chunks[2]),
                View::Insights => ui::insights::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                // Content starts after header (1) + tabs (1) + table header (1)
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, 3),
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.refresh();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Fetch once, then write the derived state as JSON
fn export_to_file(mut app: App, export_path: &Path, timeout: Duration) -> Result<()> {
    app.refresh();
    // one request timeout plus slack for decoding
    if !app.wait_for_responses(timeout + Duration::from_secs(1)) {
        warn!("Some requests did not complete; exporting what arrived");
    }
    if let Some(err) = app.load_error() {
        warn!(error = %err, "Exporting with a failed fetch");
    }

    app.export_state(export_path)?;
    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}
