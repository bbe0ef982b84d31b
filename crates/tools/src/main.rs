use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use foundation::LonLat;
use runtime::{CONFIG_ENV, Publication, Scenario, Session, SessionConfig};
use serde_json::Value;
use tools::{TextSurface, parse_assignment, parse_click, replay, replay_scenario, run_events};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "labs")]
#[command(about = "Run the GIS labs from a terminal")]
struct Cmd {
    /// Session config applied before anything else
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Output format for the final publication
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// -v for debug, -vv for trace (overrides RUST_LOG)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// GeoJSON layers followed by the panel as text
    Text,
    /// The publication as JSON
    Json,
}

#[derive(Subcommand)]
enum Action {
    /// List registered labs in display order
    List,
    /// Select a lab, apply edits, then click
    Run {
        #[arg(long)]
        lab: String,
        /// Click position as lon,lat (repeatable)
        #[arg(long = "click", value_parser = parse_click, allow_hyphen_values = true)]
        clicks: Vec<LonLat>,
        /// Parameter edit as field=value (repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        sets: Vec<(String, Value)>,
    },
    /// Replay a scenario file: {"config": {...}, "events": [...]}
    Script { path: PathBuf },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    init_tracing(cmd.verbose);

    let mut session = Session::with_builtin_labs().context("building lab registry")?;
    let mut surface = TextSurface::default();
    let mut last = None;

    if let Some(path) = &cmd.config {
        info!(path = %path.display(), "loading session config");
        let config = SessionConfig::from_path(path)?;
        last = session
            .apply_config(&config)
            .with_context(|| format!("applying {}", path.display()))?;
        if let Some(p) = &last {
            p.deliver(&mut surface);
        }
    }

    match cmd.action {
        Action::List => {
            for entry in session.registry().entries() {
                println!("{:<18} {}", entry.meta.id, entry.meta.title);
            }
            return Ok(());
        }
        Action::Run { lab, clicks, sets } => {
            let events = run_events(&lab, &sets, &clicks);
            last = replay(&mut session, &events, &mut surface)?.or(last);
        }
        Action::Script { path } => {
            let scenario = Scenario::from_path(&path)
                .with_context(|| format!("loading scenario {}", path.display()))?;
            last = replay_scenario(&mut session, &scenario, &mut surface)?.or(last);
        }
    }

    print_publication(cmd.format, last.as_ref(), &surface)
}

fn print_publication(format: Format, last: Option<&Publication>, surface: &TextSurface) -> Result<()> {
    match format {
        Format::Text => print!("{}", surface.render()?),
        Format::Json => println!("{}", serde_json::to_string_pretty(&last)?),
    }
    Ok(())
}
