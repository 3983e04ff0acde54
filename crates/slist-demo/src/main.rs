#![forbid(unsafe_code)]

//! Scripted SimpleList session.
//!
//! Publishes the example colors, taps a remove button, shuffles, recolors,
//! and selects a row, printing the rendered list after each step.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use slist_demo::{ExampleScreen, SystemColor};
use slist_runtime::ConfigError;
use slist_widgets::ListConfig;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode final state: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "slist-demo")]
#[command(about = "Drive the example color list through a scripted session")]
struct Args {
    /// Log filter (tracing-subscriber env-filter syntax)
    #[arg(long, default_value = "info")]
    log: String,

    /// List configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hold each animated batch until the next step
    #[arg(long)]
    animated: bool,

    /// Seed for the shuffle step
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Print the final entries as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<ListConfig, DemoError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| DemoError::Read {
                path: path.clone(),
                source,
            })?;
            ListConfig::from_toml_str(&text)?
        }
        None => ListConfig::default(),
    };
    if args.animated {
        config.deferred_completion = true;
    }
    Ok(config)
}

fn print_step(screen: &ExampleScreen, title: &str) {
    let settled = screen.settle();
    println!("== {title} ({settled} animation(s) finished)");
    for line in screen.render() {
        println!("{line}");
    }
    println!();
}

fn run(args: &Args) -> Result<(), DemoError> {
    let config = load_config(args)?;
    let mut screen = ExampleScreen::new(config);
    screen.list().on_error(|err| tracing::error!(error = %err, "list out of sync"));
    print_step(&screen, "initial");

    screen.tap_remove(1);
    print_step(&screen, "tapped remove on row 1");

    screen.view_model().shuffle(args.seed);
    print_step(&screen, "shuffled");

    if let Some(first) = screen.view_model().data().first() {
        screen.view_model().recolor(first.id, SystemColor::Other { r: 90, g: 90, b: 90 });
    }
    screen.view_model().append(SystemColor::Red);
    print_step(&screen, "recolored first row and appended");

    if let Some(id) = screen.select(0) {
        tracing::info!(id, "selected first row");
    }

    let stats = screen.list().reconciler().stats();
    tracing::info!(
        started = stats.sessions_started,
        completed = stats.sessions_completed,
        coalesced = stats.snapshots_coalesced,
        "session summary"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&screen.view_model().data())?);
    }
    screen.teardown();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&args.log)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "demo failed");
            ExitCode::FAILURE
        }
    }
}
