//! In-memory form of the monthly archive extracts
//!
//! - Every period has a denominator that is large enough to normalize against
//! - Every category series is sorted by strictly increasing period
//! - Every period of a category series has a denominator

pub mod builder;

use crate::{period::Period, Category, Count};
use std::collections::BTreeMap;

/// Per-language monthly counts and their monthly active user denominators
///
/// Built using [`DatasetBuilder`](builder::DatasetBuilder), which enforces the
/// invariants listed in the module documentation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Dataset {
    /// Monthly active users for each accepted period
    denominators: BTreeMap<Period, Count>,

    /// Monthly counts for each category, sorted by period
    series: BTreeMap<Category, Box<[(Period, Count)]>>,
}
//
impl Dataset {
    /// Truth that no usable period was found
    pub fn is_empty(&self) -> bool {
        self.denominators.is_empty()
    }

    /// Monthly active users over the accepted periods, in chronological order
    pub fn denominators(&self) -> impl Iterator<Item = (Period, Count)> + '_ {
        self.denominators
            .iter()
            .map(|(&period, &count)| (period, count))
    }

    /// Monthly active users for a given period, if it was accepted
    pub fn denominator(&self, period: Period) -> Option<Count> {
        self.denominators.get(&period).copied()
    }

    /// Iterate over category series, ordered by category name
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[(Period, Count)])> + '_ {
        self.series
            .iter()
            .map(|(category, series)| (&**category, &series[..]))
    }

    /// Monthly counts for a given category, sorted by period
    #[cfg(test)]
    pub fn series(&self, category: &str) -> Option<&[(Period, Count)]> {
        self.series.get(category).map(|series| &series[..])
    }

    /// Share of monthly active users for each period of a category series
    pub fn shares(&self, series: &[(Period, Count)]) -> Vec<f64> {
        series
            .iter()
            .map(|&(period, count)| {
                let denominator = self
                    .denominator(period)
                    .expect("dataset series should only cover periods with a denominator");
                count as f64 / denominator as f64
            })
            .collect()
    }
}
