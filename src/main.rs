use clap::Parser;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod company;
mod controller;
mod debounce;
mod domain;
mod fetch;
mod inputter;
mod model;
mod table;
mod ui;

use controller::Controller;
use domain::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_ENDPOINT, DEFAULT_LOG_FILE, PAGE_SIZES, ScoopConfig, ScoopError,
};
use fetch::HttpSource;
use model::{Model, Status};
use ui::TableUI;

/// Browse the SundayScoop startup database in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Endpoint returning the company list as a JSON array
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Idle time in ms before a search is applied
    #[arg(long, default_value_t = DEFAULT_DEBOUNCE_MS)]
    debounce_ms: u64,

    /// Rows per page (10, 20, 30 or 50)
    #[arg(long, default_value_t = PAGE_SIZES[0], value_parser = parse_page_size)]
    page_size: usize,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Where to write the log
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: String,
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|e| format!("{e}"))?;
    if PAGE_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {PAGE_SIZES:?}"))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let result = run(args);
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(log_file: &str) -> Result<(), ScoopError> {
    let path = shellexpand::full(log_file)
        .map_err(|e| ScoopError::InvalidArgument(format!("log file {log_file}: {e}")))?;
    let file = File::create(path.as_ref())?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scoop=info")))
        .with(
            fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), ScoopError> {
    init_logging(&args.log_file)?;
    info!("Starting scoop!");

    let cfg = ScoopConfig::default()
        .with_endpoint(args.endpoint)
        .with_debounce(Duration::from_millis(args.debounce_ms))
        .with_page_size(args.page_size)
        .with_http_timeout(Duration::from_secs(args.timeout_secs));

    let mut terminal = ratatui::init();
    let size = terminal.size()?;

    let mut model = Model::init(&cfg, size.width as usize, size.height as usize);
    model.start_fetch(HttpSource::new(cfg.endpoint.clone(), cfg.http_timeout));

    let ui = TableUI::new();
    let controller = Controller::new(&cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message);
    }

    info!("Bye!");
    Ok(())
}
