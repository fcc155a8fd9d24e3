//! Mechanism for building a [`Dataset`] from monthly observations

use super::Dataset;
use crate::{anomaly::Anomaly, period::Period, Category, Count};
use std::collections::BTreeMap;

/// Accumulator for monthly denominators and per-category observations
///
/// A period's denominator must be added before the observations from that
/// period, otherwise they will be rejected as unnormalizable. Problems with
/// the input data are logged and recorded as [`Anomaly`]s, which come out of
/// [`finish()`](Self::finish) along with the dataset.
#[derive(Debug)]
pub struct DatasetBuilder {
    /// Denominators at or below this value are rejected
    min_denominator: Count,

    /// Accepted denominators
    denominators: BTreeMap<Period, Count>,

    /// Accepted observations, grouped by category then period
    series: BTreeMap<Category, BTreeMap<Period, Count>>,

    /// Problems encountered so far
    anomalies: Vec<Anomaly>,
}
//
impl DatasetBuilder {
    /// Set up the accumulator
    pub fn new(min_denominator: Count) -> Self {
        Self {
            min_denominator,
            denominators: BTreeMap::new(),
            series: BTreeMap::new(),
            anomalies: Vec::new(),
        }
    }

    /// Record the monthly active user count of a period
    ///
    /// Returns truth that the period was accepted. Periods with too few
    /// monthly active users are rejected, as dividing by a small number would
    /// produce spikes that dominate the normalized series.
    pub fn add_denominator(&mut self, period: Period, denominator: Count) -> bool {
        if denominator <= self.min_denominator {
            self.record(Anomaly::UnreliableDenominator {
                period,
                denominator,
            });
            return false;
        }
        if self.denominators.contains_key(&period) {
            self.record(Anomaly::DuplicateDenominator { period });
            return false;
        }
        self.denominators.insert(period, denominator);
        true
    }

    /// Record how many monthly active users a category had over a period
    ///
    /// Returns truth that the observation was accepted. Only the first
    /// observation of a category within a period is kept.
    pub fn add_observation(&mut self, category: Category, period: Period, count: Count) -> bool {
        if !self.denominators.contains_key(&period) {
            self.record(Anomaly::Unnormalizable { period, category });
            return false;
        }
        let series = self.series.entry(category.clone()).or_default();
        if series.contains_key(&period) {
            self.record(Anomaly::DuplicateCategory { period, category });
            return false;
        }
        log::trace!("Accepted {count} monthly active users of {category:?} in {period}");
        series.insert(period, count);
        true
    }

    /// Log and keep track of a data problem
    pub fn record(&mut self, anomaly: Anomaly) {
        anomaly.log();
        self.anomalies.push(anomaly);
    }

    /// Export the dataset and the problems encountered while building it
    pub fn finish(self) -> (Dataset, Vec<Anomaly>) {
        let series = self
            .series
            .into_iter()
            .map(|(category, periods)| (category, periods.into_iter().collect()))
            .collect();
        let dataset = Dataset {
            denominators: self.denominators,
            series,
        };
        (dataset, self.anomalies)
    }
}
