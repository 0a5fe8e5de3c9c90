use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use sqlgen::{load_config, run, RunArg, SummaryRenderer};

#[derive(Parser)]
#[command(name = "sqlgen")]
#[command(author, version, about = "Generate typed data-access models from MySQL SQL")]
struct Cli {
    /// YAML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MySQL DSN, e.g. user:pass@tcp(127.0.0.1:3306)/db
    #[arg(short, long)]
    dsn: Option<String>,

    /// SQL file patterns (comma-separated in the last path component)
    #[arg(short, long, num_args = 1..)]
    filename: Vec<String>,

    /// Table name patterns, used with --dsn
    #[arg(short, long, num_args = 1..)]
    table: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging; RUST_LOG takes priority over --verbose
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut arg = match &cli.config {
        Some(path) => load_config(path)?,
        None => RunArg::default(),
    };
    if let Some(dsn) = cli.dsn {
        arg.dsn = dsn;
    }
    if !cli.filename.is_empty() {
        arg.filename = cli.filename;
    }
    if !cli.table.is_empty() {
        arg.table = cli.table;
    }

    let output = run(&arg, &SummaryRenderer::from_arg(&arg))?;
    print!("{}", output);

    Ok(())
}
