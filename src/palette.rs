//! Consistent colours for each language across charts

use crate::Category;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Palette configuration
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteConfig {
    /// Colours to pick from
    pub colours: Vec<Box<str>>,

    /// Categories that always get a certain colour, by index in `colours`
    pub pinned: BTreeMap<Category, usize>,
}
//
impl Default for PaletteConfig {
    /// d3's schemeCategory10, with the monthly active users in the first
    /// colour
    fn default() -> Self {
        Self {
            colours: [
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2",
                "#7f7f7f", "#bcbd22", "#17becf",
            ]
            .into_iter()
            .map(Box::from)
            .collect(),
            pinned: std::iter::once((crate::trends::MAU.into(), 0)).collect(),
        }
    }
}

/// Colour assignment for a set of categories
///
/// Colours only depend on the palette and on the set of categories, not on
/// the order in which categories are charted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette(HashMap<Category, Box<str>>);
//
impl Palette {
    /// Assign colours to categories
    ///
    /// Pinned categories get their configured colour, the others cycle through
    /// the palette in order of category name.
    pub fn new<'a>(
        config: &PaletteConfig,
        categories: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        assert!(!config.colours.is_empty(), "palette should not be empty");
        let mut categories = categories.into_iter().collect::<Vec<_>>();
        categories.sort_unstable();
        categories.dedup();
        let colours = categories
            .into_iter()
            .enumerate()
            .map(|(idx, category)| {
                let idx = config.pinned.get(category).copied().unwrap_or(idx);
                let colour = config.colours[idx % config.colours.len()].clone();
                (category.into(), colour)
            })
            .collect();
        Self(colours)
    }

    /// Colour of a category, if it was part of the initial set
    pub fn colour(&self, category: &str) -> Option<&str> {
        self.0.get(category).map(|colour| &**colour)
    }
}
