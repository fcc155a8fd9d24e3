//! Population and GDP of countries, used to put per-country user counts in
//! perspective
//!
//! Country names follow the geocoder that located GitHub users, whereas the
//! GDP figures come from the World Bank, which names some countries
//! differently. A fixed table copies World Bank names onto geocoder names.

use crate::{config::ReferenceConfig, Result};
use anyhow::Context;
use std::{
    collections::HashMap,
    fs::File,
    io::{Read, Write},
    path::Path,
};

/// Geocoder country names, and the dataset names they are copied from
const REMAPS: &[(&str, &str)] = &[
    ("Russia", "Russian Federation"),
    ("South Korea", "Korea, Rep."),
    ("Iran", "Iran, Islamic Rep."),
    ("Czechia", "Czech Republic"),
    ("Egypt", "Egypt, Arab Rep."),
    ("Hong Kong", "Hong Kong SAR, China"),
    ("Venezuela", "Venezuela, RB"),
    ("Slovakia", "Slovak Republic"),
    ("Macedonia (FYROM)", "Macedonia, FYR"),
    ("Myanmar (Burma)", "Myanmar"),
    ("Syria", "Syrian Arab Republic"),
    ("Côte d'Ivoire", "Cote d'Ivoire"),
    ("Yemen", "Yemen, Rep."),
    ("Democratic Republic of the Congo", "Congo, Dem. Rep."),
    ("Republic of the Congo", "Congo, Rep."),
    ("Kyrgyzstan", "Kyrgyz Republic"),
    ("Laos", "Lao PDR"),
    ("Brunei", "Brunei Darussalam"),
    ("The Bahamas", "Bahamas, The"),
    ("Macau", "Macao SAR, China"),
    ("The Gambia", "Gambia, The"),
    ("U.S. Virgin Islands", "Virgin Islands (U.S.)"),
    ("Saint Lucia", "St. Lucia"),
    ("Saint Kitts and Nevis", "St. Kitts and Nevis"),
    ("North Korea", "Korea, Dem. People’s Rep."),
];

/// Taiwan is missing from both datasets (2016 figures)
const TAIWAN: &str = "Taiwan";
const TAIWAN_POPULATION: u64 = 23_539_816;
const TAIWAN_GDP: f64 = 571_500_000_000.0;

/// First field of the column header row of World Bank exports
const WORLD_BANK_HEADER: &str = "Country Name";

/// Country name
pub type Country = Box<str>;

/// Population and GDP of each country
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceData {
    populations: HashMap<Country, u64>,
    gdp: HashMap<Country, f64>,
}
//
impl ReferenceData {
    /// Load the configured datasets
    pub fn load(config: &ReferenceConfig) -> Result<Self> {
        let population_path = config
            .population
            .as_deref()
            .context("no population dataset is configured (reference.population)")?;
        let gdp_path = config
            .gdp
            .as_deref()
            .context("no GDP dataset is configured (reference.gdp)")?;
        let populations = load_populations(open(population_path)?)
            .with_context(|| format!("loading populations from {}", population_path.display()))?;
        let gdp = load_gdp(open(gdp_path)?)
            .with_context(|| format!("loading GDP from {}", gdp_path.display()))?;
        Ok(Self { populations, gdp })
    }

    /// Population of a country, if known
    pub fn population(&self, country: &str) -> Option<u64> {
        self.populations.get(country).copied()
    }

    /// Gross domestic product of a country in current US dollars, if known
    pub fn gdp(&self, country: &str) -> Option<f64> {
        self.gdp.get(country).copied()
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input)
}

/// Line of the input where a record starts
fn line(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

/// Load a headerless `country,_,_,population` CSV dataset
pub fn load_populations<R: Read>(input: R) -> Result<HashMap<Country, u64>> {
    let mut populations = HashMap::new();
    for record in csv_reader(input).into_records() {
        let record = record.context("reading population records")?;
        let parsed = match (record.get(0), record.get(3)) {
            (Some(country), Some(population)) => population
                .trim()
                .parse::<u64>()
                .map(|population| (country, population))
                .map_err(|e| format!("invalid population {population:?} ({e})")),
            _ => Err(format!("expected 4 fields, found {}", record.len())),
        };
        match parsed {
            Ok((country, population)) => {
                populations.insert(country.into(), population);
            }
            Err(reason) => log::warn!("Skipping population line {}: {reason}", line(&record)),
        }
    }
    remap(&mut populations, 0);
    populations.insert(TAIWAN.into(), TAIWAN_POPULATION);
    Ok(populations)
}

/// Load a World Bank GDP export, keeping the latest known value of each row
pub fn load_gdp<R: Read>(input: R) -> Result<HashMap<Country, f64>> {
    let mut gdp = HashMap::new();
    let mut in_preamble = true;
    for record in csv_reader(input).into_records() {
        let record = record.context("reading GDP records")?;
        if in_preamble {
            in_preamble = record.get(0) != Some(WORLD_BANK_HEADER);
            continue;
        }
        let latest = record.iter().rev().find(|field| !field.trim().is_empty());
        let parsed = match (record.get(0), latest) {
            (Some(country), Some(value)) => value
                .trim()
                .parse::<f64>()
                .map(|value| (country, value))
                .map_err(|e| format!("invalid GDP {value:?} ({e})")),
            _ => Err("row is empty".to_owned()),
        };
        match parsed {
            Ok((country, value)) => {
                gdp.insert(country.into(), value);
            }
            Err(reason) => log::warn!("Skipping GDP line {}: {reason}", line(&record)),
        }
    }
    if in_preamble {
        log::warn!("No {WORLD_BANK_HEADER:?} header row in GDP dataset, no data was loaded");
    }
    remap(&mut gdp, 0.0);
    gdp.insert(TAIWAN.into(), TAIWAN_GDP);
    Ok(gdp)
}

/// Copy dataset values onto the geocoder's country names
///
/// Geocoder names whose source is missing get the `missing` placeholder.
fn remap<V: Copy>(values: &mut HashMap<Country, V>, missing: V) {
    for &(target, source) in REMAPS {
        let value = values.get(source).copied().unwrap_or_else(|| {
            log::info!("No reference data for {source:?}, which {target:?} is copied from");
            missing
        });
        values.insert(target.into(), value);
    }
}

/// Append `population` and `gdp` columns to a TSV table whose first column is
/// a country name
pub fn annotate<R: Read, W: Write>(reference: &ReferenceData, input: R, output: W) -> Result<()> {
    let mut input = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(input);
    let mut output = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(output);

    let mut header = input
        .headers()
        .context("reading country table header")?
        .clone();
    header.push_field("population");
    header.push_field("gdp");
    output.write_record(&header)?;

    for record in input.records() {
        let mut record = record.context("reading country table")?;
        let country = record.get(0).unwrap_or_default().to_owned();
        let population = reference.population(&country).unwrap_or_else(|| {
            log::info!("Unknown population for {country:?}");
            0
        });
        let gdp = reference.gdp(&country).unwrap_or_else(|| {
            log::info!("Unknown GDP for {country:?}");
            0.0
        });
        record.push_field(&population.to_string());
        record.push_field(&gdp.to_string());
        output.write_record(&record)?;
    }
    output.flush().context("flushing the country table")?;
    Ok(())
}

/// Annotate a country table file with the configured reference data
pub fn annotate_countries(config: &ReferenceConfig, input: &Path, output: &Path) -> Result<()> {
    let reference = ReferenceData::load(config)?;
    let input_file = open(input)?;
    let output_file =
        File::create(output).with_context(|| format!("creating {}", output.display()))?;
    annotate(&reference, input_file, output_file)
        .with_context(|| format!("annotating country table {}", input.display()))
}
