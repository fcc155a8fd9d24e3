//! Processing pipeline configuration
//!
//! The configuration file is shared with the archive scrapers, so sections
//! that belong to them are ignored rather than rejected.

use crate::{
    palette::PaletteConfig, period::Period, ranking::Denylist, smoothing::SavitzkyGolay, Count,
    Result,
};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Final process configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Root of the monthly archive extracts
    #[serde(alias = "githubarchivepath")]
    pub archive_path: PathBuf,

    /// How monthly counts are turned into trends
    #[serde(default)]
    pub trends: TrendsConfig,

    /// Where outputs are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Ranked summary page
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Colours of each language in charts
    #[serde(default)]
    pub palette: PaletteConfig,

    /// Groups of languages that are charted together
    #[serde(default = "default_charts")]
    pub charts: Vec<ChartConfig>,

    /// Reference datasets about countries
    #[serde(default)]
    pub reference: ReferenceConfig,
}
//
impl Config {
    /// Load and validate the configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing configuration file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating configuration file {}", path.display()))?;
        Ok(config)
    }

    /// Check the configuration for basic sanity
    pub fn validate(&self) -> Result<()> {
        self.trends.smoothing.validate()?;
        anyhow::ensure!(
            !self.palette.colours.is_empty(),
            "the chart palette needs at least one colour"
        );
        for chart in &self.charts {
            anyhow::ensure!(
                !chart.name.is_empty() && !chart.name.contains(['/', '\\']),
                "chart name {:?} cannot be used as a file name",
                chart.name
            );
        }
        Ok(())
    }

    /// Location of the ranking table
    pub fn ranking_path(&self) -> PathBuf {
        self.output.dir.join(&*self.output.ranking)
    }

    /// Location of the series table of a chart
    pub fn chart_path(&self, chart: &ChartConfig) -> PathBuf {
        self.output.dir.join(format!("{}.tsv", chart.name))
    }

    /// Location of the summary page
    pub fn summary_path(&self) -> PathBuf {
        self.output.dir.join(&self.summary.output)
    }
}

/// Subset of the configuration that affects which data is loaded/kept
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TrendsConfig {
    /// First period to be scanned
    pub epoch: Period,

    /// Periods with this many monthly active users or fewer are skipped
    pub min_denominator: Count,

    /// Languages with this many months of data or fewer are left out
    pub min_periods: usize,

    /// Name of the per-period file holding the monthly active user count
    pub denominator_file: Box<str>,

    /// Name of the per-period file holding per-language counts
    pub counts_file: Box<str>,

    /// Noise reduction filter
    pub smoothing: SavitzkyGolay,
}
//
impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            epoch: Period::new(2011, 1).expect("January is a valid month"),
            min_denominator: 1000,
            min_periods: 12,
            denominator_file: "mau.txt".into(),
            counts_file: "language_mau.txt".into(),
            smoothing: SavitzkyGolay::default(),
        }
    }
}

/// Output locations
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory where all outputs go
    pub dir: PathBuf,

    /// File name of the ranking table
    pub ranking: Box<str>,
}
//
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".into(),
            ranking: "language_ranking.tsv".into(),
        }
    }
}

/// Ranked summary page
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryConfig {
    /// Number of languages on the page
    pub count: usize,

    /// Handlebars template, the built-in one is used if unset
    pub template: Option<PathBuf>,

    /// Rendered page, relative to the output directory
    pub output: PathBuf,

    /// Categories that are not ranked
    pub denylist: Denylist,
}
//
impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            count: 25,
            template: None,
            output: "language_popularity.md".into(),
            denylist: Denylist::default(),
        }
    }
}

/// Group of languages that are charted together
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChartConfig {
    /// Chart name, also used as the output file stem
    pub name: Box<str>,

    /// Charted languages
    pub languages: Vec<Box<str>>,

    /// Plot the share of monthly active users rather than raw counts
    #[serde(default = "yes")]
    pub normalize: bool,
}

/// Chart groups used in the blog post
fn default_charts() -> Vec<ChartConfig> {
    let chart = |name: &str, languages: &[&str], normalize| ChartConfig {
        name: name.into(),
        languages: languages.iter().map(|&l| l.into()).collect(),
        normalize,
    };
    vec![
        chart("mau", &["MAU"], false),
        chart(
            "major",
            &["JavaScript", "Python", "Java", "C++", "C", "C#"],
            true,
        ),
        chart(
            "cannibals",
            &["TypeScript", "CoffeeScript", "Objective-C", "Swift"],
            true,
        ),
        chart("newthing", &["Go", "TypeScript", "Kotlin", "Rust"], true),
        chart(
            "oldthing",
            &["Ruby", "PHP", "Objective-C", "CoffeeScript", "Perl"],
            true,
        ),
        chart(
            "oldthing_u",
            &["Ruby", "PHP", "Objective-C", "CoffeeScript", "Perl"],
            false,
        ),
        chart("scientific", &["R", "Matlab", "Jupyter Notebook"], true),
        chart(
            "functional",
            &["Scala", "Haskell", "Lisp", "Clojure", "Erlang", "Elixir"],
            true,
        ),
    ]
}

fn yes() -> bool {
    true
}

/// Reference datasets about countries
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceConfig {
    /// Headerless `country,_,_,population` CSV
    pub population: Option<PathBuf>,

    /// World Bank GDP CSV
    pub gdp: Option<PathBuf>,
}
