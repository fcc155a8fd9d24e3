//! This program tracks the popularity of programming languages on GitHub,
//! based on monthly extracts of the GitHub Archive
//! (<https://www.gharchive.org/>).
//!
//! Each month, the number of users that pushed code in a language is divided
//! by the number of monthly active users (MAU), so that languages can be
//! compared over time even though GitHub keeps growing.

mod anomaly;
mod archive;
mod config;
mod dataset;
mod palette;
mod period;
mod progress;
mod ranking;
mod reference;
mod smoothing;
mod summary;
mod trends;
mod tsv;

use crate::{config::Config, palette::Palette, period::Period, progress::ProgressReport};
use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::{
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
};

/// Normalize, smooth and rank the popularity of programming languages on
/// GitHub
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Configuration file
    ///
    /// The configuration file is shared with the archive scrapers, which is
    /// why it may contain settings that this program ignores.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Operation to be carried out
    #[command(subcommand)]
    command: Command,
}
//
impl Args {
    /// Decode and validate CLI arguments
    pub fn parse_and_check() -> Result<Self> {
        // Decode CLI arguments
        let args = Args::parse();

        // Check CLI arguments for basic sanity
        if let Command::Countries { input, output } = &args.command {
            anyhow::ensure!(
                input != output,
                "annotating the country table in place would destroy it"
            );
        }
        Ok(args)
    }
}

/// Operations supported by this program
#[derive(Subcommand, Debug)]
enum Command {
    /// Compute language trends, and write the ranking, charts and summary
    Trends {
        /// First month that is left out, in YYYY-MM format
        ///
        /// By default, we stop before the month that contains yesterday,
        /// whose data is still being extracted.
        #[arg(short, long)]
        until: Option<Period>,
    },

    /// Append population and GDP columns to a per-country table
    Countries {
        /// Tab-separated table whose first column is a country name
        #[arg(short, long)]
        input: PathBuf,

        /// Where the annotated table should be written
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Set up logging
    setup_logging().map_err(|e| anyhow::format_err!("{e}"))?;

    // Decode CLI arguments
    let args = Args::parse_and_check()?;

    // Load the configuration, before anything is written
    let config = Config::load(&args.config)?;

    match args.command {
        Command::Trends { until } => run_trends(&config, until),
        Command::Countries { input, output } => {
            reference::annotate_countries(&config.reference, &input, &output)
        }
    }
}

/// Compute and publish language trends
fn run_trends(config: &Config, until: Option<Period>) -> Result<()> {
    let today = Local::now().date_naive();
    let end = until.unwrap_or_else(|| Period::first_incomplete(today));

    // Set up progress reporting
    let report = ProgressReport::new();

    // Collect the dataset
    let (dataset, anomalies) = archive::scan(&config.archive_path, &config.trends, end, &report)?;
    if dataset.is_empty() {
        log::warn!("No usable month of data before {end}, outputs will be empty");
    }

    // Compute and rank trends
    let trends = trends::build(&dataset, &config.trends);
    let mau = trends::denominator_trend(&dataset, &config.trends);
    let palette = Palette::new(
        &config.palette,
        trends
            .iter()
            .map(|trend| trend.category())
            .chain(std::iter::once(trends::MAU)),
    );
    let ranking = ranking::rank(&trends, &config.summary.denylist);

    // Write down the outputs
    fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("creating output directory {}", config.output.dir.display()))?;
    let mut ranking_table = tsv::create(&config.ranking_path())?;
    tsv::write_ranking(&mut ranking_table, &ranking)?;
    for chart in &config.charts {
        let mut chart_table = tsv::create(&config.chart_path(chart))?;
        tsv::write_chart(&mut chart_table, chart, &trends, mau.as_ref(), &palette)?;
    }
    summary::write(
        &config.summary,
        &config.summary_path(),
        &ranking,
        &palette,
        today,
    )?;

    // Report on data quality
    let num_warnings = anomalies.iter().filter(|a| a.is_warning()).count();
    log::info!(
        "Done with {} data anomalies, including {num_warnings} warnings",
        anomalies.len()
    );
    if num_warnings > 0 {
        eprintln!("{num_warnings} damaged input records were skipped, see the system log");
    }

    // Display the top languages
    {
        let stdout = std::io::stdout().lock();
        let mut stdout = BufWriter::new(stdout);
        for ranked in ranking.iter().take(config.summary.count) {
            writeln!(
                stdout,
                "{:>3}. {:<20} {:.2}%",
                ranked.rank,
                ranked.trend.category(),
                100.0 * ranked.trend.latest_share()
            )?;
        }
        stdout.flush()?;
    }
    Ok(())
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Name of a tracked category, usually a programming language
pub type Category = Box<str>;

/// Number of monthly active users
pub type Count = u64;

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}
