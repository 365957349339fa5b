//! Settlement audit over a JSON export of recorded rounds.
//!
//! Usage:
//!   cargo run --release --bin table-audit -- --input rounds.json
//!   cargo run --release --bin table-audit -- --input rounds.json --game dragon-tiger --json report.json
//!   cargo run --release --bin table-audit -- --input rounds.json --tui

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::prelude::*;
use std::io::{self, IsTerminal, Stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use table_audit::config::AuditConfig;
use table_audit::driver::{parse_batch, BatchDriver, GameSelection};
use table_audit::report::AuditReport;
use table_audit::tui::{app::AppState, controller};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recompute and check recorded table-game settlements")]
struct Args {
    /// JSON array of round records (a single object is one round).
    #[arg(short, long, required_unless_present = "dump_tables")]
    input: Option<PathBuf>,

    /// Game title, or `auto` to pick by each round's ServerID.
    #[arg(short, long, default_value = "auto")]
    game: GameSelection,

    /// Run configuration (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replacement catalog (JSON); overrides the config file's.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Write the report as JSON to this path (`-` for stdout).
    #[arg(long)]
    json: Option<PathBuf>,

    /// Browse the report in a terminal viewer.
    #[arg(long)]
    tui: bool,

    /// Log filter when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the active catalog as JSON and exit.
    #[arg(long)]
    dump_tables: bool,
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn browse(report: AuditReport) -> Result<()> {
    if !io::stdout().is_terminal() {
        bail!("--tui requires a real terminal (TTY)");
    }
    let mut terminal = setup_terminal().context("entering the alternate screen")?;
    let mut app = AppState::new(report);
    let res = controller::run(&mut terminal, &mut app, Duration::from_millis(250));
    // Always attempt to restore terminal
    restore_terminal(terminal).context("restoring the terminal")?;
    Ok(res?)
}

fn write_json(report: &AuditReport, path: &Path) -> Result<()> {
    let text = report.to_json().context("serializing report")?;
    if path.as_os_str() == "-" {
        println!("{text}");
    } else {
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn run(args: Args) -> Result<bool> {
    let mut config = match &args.config {
        Some(path) => AuditConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => AuditConfig::default(),
    };
    if args.catalog.is_some() {
        config.catalog = args.catalog.clone();
    }
    let catalog = config.catalog().context("loading catalog")?;
    catalog.validate().context("validating catalog")?;

    if args.dump_tables {
        println!("{}", catalog.to_json()?);
        return Ok(true);
    }

    let Some(input) = &args.input else {
        bail!("--input is required");
    };
    let text = std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let records = parse_batch(&text).with_context(|| format!("parsing {}", input.display()))?;

    let driver = BatchDriver::new(&catalog, args.game, &config)?;
    let report = driver.run(&records);

    if let Some(path) = &args.json {
        write_json(&report, path)?;
    }
    let clean = report.is_clean();
    if args.tui {
        browse(report)?;
    } else if args.json.as_deref().map_or(true, |p| p.as_os_str() != "-") {
        print!("{report}");
    }
    Ok(clean)
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = init_tracing(&args.log_level) {
        eprintln!("error: {err:#}");
        return ExitCode::from(2);
    }
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
