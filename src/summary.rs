//! Templated summary page of the language ranking

use crate::{config::SummaryConfig, palette::Palette, ranking::Ranked, Result};
use anyhow::Context;
use chrono::NaiveDate;
use handlebars::Handlebars;
use serde::Serialize;
use std::{fs, path::Path};

/// Template used when none is configured
const BUILTIN_TEMPLATE: &str = include_str!("../templates/summary.md.hbs");

/// Language entry, as seen by templates
#[derive(Debug, Serialize)]
struct Language<'a> {
    language: &'a str,
    share: String,
    rank: usize,
    colour: &'a str,
}

/// Data available to templates
#[derive(Debug, Serialize)]
struct Page<'a> {
    languages: Vec<Language<'a>>,
    preamble: String,
    generated_at: String,
}

/// Render the summary page with the top `count` languages
pub fn render(
    template: &str,
    template_name: &str,
    ranking: &[Ranked<'_>],
    palette: &Palette,
    count: usize,
    generated: NaiveDate,
) -> Result<String> {
    let generated_at = generated.format("%B %d %Y").to_string();
    let languages = ranking
        .iter()
        .take(count)
        .map(|ranked| Language {
            language: ranked.trend.category(),
            share: format!("{:.2}%", 100.0 * ranked.trend.latest_share()),
            rank: ranked.rank,
            colour: palette.colour(ranked.trend.category()).unwrap_or_default(),
        })
        .collect();
    let page = Page {
        languages,
        preamble: format!(
            "This File was Autogenerated from {template_name} on {generated_at}. \
             Do not modify this file"
        ),
        generated_at,
    };
    // Output is Markdown, not HTML
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    handlebars
        .render_template(template, &page)
        .with_context(|| format!("rendering {template_name}"))
}

/// Render the configured summary page and save it
pub fn write(
    config: &SummaryConfig,
    output: &Path,
    ranking: &[Ranked<'_>],
    palette: &Palette,
    generated: NaiveDate,
) -> Result<()> {
    let (template, template_name) = match &config.template {
        Some(path) => (
            fs::read_to_string(path)
                .with_context(|| format!("reading summary template {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (
            BUILTIN_TEMPLATE.to_owned(),
            "the built-in template".to_owned(),
        ),
    };
    let page = render(
        &template,
        &template_name,
        ranking,
        palette,
        config.count,
        generated,
    )?;
    fs::write(output, page).with_context(|| format!("writing summary page {}", output.display()))
}
