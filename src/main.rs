//! ezafe: find ezafe constructions in a directory of CoNLL-U files
//!
//! Usage:
//!   ezafe [OPTIONS] <CORPUS_DIR>
//!
//! Writes a CSV report (default `ezafe_constructions_output.csv`) and prints
//! the same rows as a table on stdout. Log output goes to stderr; set
//! `RUST_LOG` or pass `-v` for more.

use anyhow::{Context, Result};
use clap::Parser;
use ezafe::config::DEFAULT_OUTPUT;
use ezafe::{Config, EZAFE_LEMMA, MatchScope, render_table, run};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "ezafe")]
#[command(about = "Extract ezafe constructions from CoNLL-U dependency parses")]
struct Cli {
    /// Directory containing the annotated corpus files
    corpus_dir: PathBuf,

    /// CSV report path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Lemma of the ezafe particle
    #[arg(long, default_value = EZAFE_LEMMA)]
    lemma: String,

    /// Resolve ids per sentence or across a whole file
    #[arg(long, default_value = "sentence")]
    scope: MatchScope,

    /// File name suffix to include (repeatable; default .conllu and .conllu.gz)
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Number of worker threads
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Stop at the first unreadable file instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Don't print the table to stdout
    #[arg(long)]
    no_table: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config {
            output: self.output.clone(),
            particle_lemma: self.lemma.clone(),
            scope: self.scope,
            jobs: self.jobs.max(1),
            strict: self.strict,
            ..Config::new(&self.corpus_dir)
        };
        if !self.extensions.is_empty() {
            config.extensions = self.extensions.clone();
        }
        config
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config();
    let summary = run(&config).with_context(|| {
        format!(
            "failed to extract constructions from {}",
            config.corpus_root.display()
        )
    })?;

    if !cli.no_table {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(render_table(&summary.rows).as_bytes())
            .context("failed to print table")?;
    }

    Ok(())
}
