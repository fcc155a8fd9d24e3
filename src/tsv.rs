//! Tab-separated output tables

use crate::{
    config::ChartConfig,
    palette::Palette,
    period::Period,
    ranking::Ranked,
    trends::{Trend, MAU},
    Result,
};
use anyhow::Context;
use serde::Serialize;
use std::{fs::File, io::Write, path::Path};

/// Set up a TSV writer
pub fn writer<W: Write>(output: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(output)
}

/// Create a TSV output file
pub fn create(path: &Path) -> Result<csv::Writer<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(writer(file))
}

/// Row of the ranking table
#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    language: &'a str,
    share: f64,
    rank: usize,
}

/// Write down the language ranking
pub fn write_ranking<W: Write>(
    output: &mut csv::Writer<W>,
    ranking: &[Ranked<'_>],
) -> Result<()> {
    for ranked in ranking {
        output.serialize(RankingRow {
            language: ranked.trend.category(),
            share: ranked.trend.latest_share(),
            rank: ranked.rank,
        })?;
    }
    output.flush().context("flushing the ranking table")?;
    Ok(())
}

/// Row of a chart series table
#[derive(Debug, Serialize)]
struct ChartRow<'a> {
    language: &'a str,
    period: Period,
    value: f64,
    colour: &'a str,
}

/// Write down the series of a chart, in long format
///
/// Values are percentages of monthly active users for normalized charts, and
/// monthly active users otherwise. Languages without a trend are left out.
pub fn write_chart<W: Write>(
    output: &mut csv::Writer<W>,
    chart: &ChartConfig,
    trends: &[Trend],
    mau: Option<&Trend>,
    palette: &Palette,
) -> Result<()> {
    for language in &chart.languages {
        let trend = if &**language == MAU {
            mau
        } else {
            trends.iter().find(|trend| trend.category() == &**language)
        };
        let Some(trend) = trend else {
            log::info!(
                "Leaving {language:?} out of chart {:?}: no trend for it",
                chart.name
            );
            continue;
        };
        let colour = palette.colour(language).unwrap_or_default();
        let values: Vec<f64> = if chart.normalize {
            trend
                .normalized()
                .iter()
                .map(|share| 100.0 * share)
                .collect()
        } else {
            trend.counts().to_vec()
        };
        for (&period, value) in trend.periods().iter().zip(values) {
            output.serialize(ChartRow {
                language,
                period,
                value,
                colour,
            })?;
        }
    }
    output
        .flush()
        .with_context(|| format!("flushing the series of chart {:?}", chart.name))?;
    Ok(())
}
