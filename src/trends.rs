//! Turn per-language monthly counts into comparable, ranked trends

use crate::{config::TrendsConfig, dataset::Dataset, period::Period, Category};
use std::cmp::Ordering;

/// Name of the trend that tracks the monthly active users themselves
pub const MAU: &str = "MAU";

/// Smoothed history of a language's popularity
///
/// Periods are strictly increasing, and there is one raw count and one share
/// of monthly active users per period. A trend always has at least one period.
#[derive(Clone, Debug, PartialEq)]
pub struct Trend {
    /// Language (or [`MAU`])
    category: Category,

    /// Periods covered by the trend
    periods: Box<[Period]>,

    /// Smoothed monthly active users of the language
    counts: Box<[f64]>,

    /// Smoothed share of all monthly active users
    normalized: Box<[f64]>,
}
//
impl Trend {
    /// Build a trend from already smoothed series
    fn new(
        category: Category,
        periods: Box<[Period]>,
        counts: Vec<f64>,
        normalized: Vec<f64>,
    ) -> Self {
        assert!(!periods.is_empty(), "trends should not be empty");
        assert_eq!(counts.len(), periods.len());
        assert_eq!(normalized.len(), periods.len());
        debug_assert!(periods.windows(2).all(|w| w[0] < w[1]));
        Self {
            category,
            periods,
            counts: counts.into(),
            normalized: normalized.into(),
        }
    }

    /// Language whose popularity is tracked
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Periods covered by the trend, in chronological order
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Smoothed monthly active users of the language
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Smoothed share of all monthly active users
    pub fn normalized(&self) -> &[f64] {
        &self.normalized
    }

    /// Most recent share of monthly active users
    pub fn latest_share(&self) -> f64 {
        *self.normalized.last().expect("trends should not be empty")
    }
}

/// Build the trends of all languages with enough history, most popular first
///
/// "Most popular" means having the largest share of monthly active users over
/// the most recent period of the trend.
pub fn build(dataset: &Dataset, config: &TrendsConfig) -> Vec<Trend> {
    let mut trends = dataset
        .categories()
        .filter_map(|(category, series)| {
            if !has_enough_history(config, category, series.len()) {
                return None;
            }
            let periods = series.iter().map(|&(period, _)| period).collect();
            let counts = series
                .iter()
                .map(|&(_, count)| count as f64)
                .collect::<Vec<_>>();
            let shares = dataset.shares(series);
            Some(Trend::new(
                category.into(),
                periods,
                config.smoothing.apply(&counts),
                config.smoothing.apply(&shares),
            ))
        })
        .collect::<Vec<_>>();
    trends.sort_unstable_by(by_decreasing_popularity);
    log::debug!("Built trends for {} languages", trends.len());
    trends
}

/// Build the trend of the monthly active users, if there is enough history
///
/// Its normalized series is the share of monthly active users that are
/// monthly active users, i.e. 1.
pub fn denominator_trend(dataset: &Dataset, config: &TrendsConfig) -> Option<Trend> {
    let (periods, counts): (Vec<Period>, Vec<f64>) = dataset
        .denominators()
        .map(|(period, count)| (period, count as f64))
        .unzip();
    if !has_enough_history(config, MAU, periods.len()) {
        return None;
    }
    let normalized = vec![1.0; periods.len()];
    Some(Trend::new(
        MAU.into(),
        periods.into(),
        config.smoothing.apply(&counts),
        normalized,
    ))
}

/// Check that a series spans enough periods to judge a trend
fn has_enough_history(config: &TrendsConfig, category: &str, num_periods: usize) -> bool {
    let enough = num_periods > config.min_periods;
    if !enough {
        log::info!(
            "Skipping language {category:?}: {num_periods} months of data is not more than {}",
            config.min_periods
        );
    }
    enough
}

/// Ordering of trends by decreasing latest share, then by name
fn by_decreasing_popularity(a: &Trend, b: &Trend) -> Ordering {
    b.latest_share()
        .total_cmp(&a.latest_share())
        .then_with(|| a.category.cmp(&b.category))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{dataset::builder::DatasetBuilder, Count};

    /// Trend whose share stays the same over 13 months of 2015-2016
    pub fn constant_trend(category: &str, share: f64) -> Trend {
        let periods = Period::new(2015, 1)
            .unwrap()
            .until(Period::new(2016, 2).unwrap())
            .collect::<Box<[_]>>();
        let len = periods.len();
        Trend::new(
            category.into(),
            periods,
            vec![share * 1e5; len],
            vec![share; len],
        )
    }

    fn months(count: usize) -> Vec<Period> {
        Period::new(2015, 1)
            .unwrap()
            .until(Period::new(2030, 1).unwrap())
            .take(count)
            .collect()
    }

    /// Dataset with the given per-language monthly counts over consecutive
    /// months starting from 2015-01, and 50 000 monthly active users
    fn dataset(languages: &[(&str, &[Count])]) -> Dataset {
        let mut builder = DatasetBuilder::new(1000);
        for period in months(30) {
            builder.add_denominator(period, 50_000);
        }
        for (language, counts) in languages {
            for (period, &count) in months(counts.len()).into_iter().zip(*counts) {
                builder.add_observation((*language).into(), period, count);
            }
        }
        builder.finish().0
    }

    #[test]
    fn empty_dataset() {
        let dataset = Dataset::default();
        assert!(build(&dataset, &TrendsConfig::default()).is_empty());
        assert!(denominator_trend(&dataset, &TrendsConfig::default()).is_none());
    }

    #[test]
    fn short_histories_are_left_out() {
        let dataset = dataset(&[("Elm", &[100; 12][..]), ("Rust", &[100; 13][..])]);
        let trends = build(&dataset, &TrendsConfig::default());
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].category(), "Rust");
        assert!(trends.iter().all(|trend| trend.periods().len() > 12));
    }

    #[test]
    fn series_lengths_match() {
        let growing = (1..=20).map(|i| i * 100).collect::<Vec<_>>();
        let dataset = dataset(&[("Go", &growing[..]), ("Perl", &[700; 15][..])]);
        for trend in build(&dataset, &TrendsConfig::default()) {
            assert_eq!(trend.counts().len(), trend.periods().len());
            assert_eq!(trend.normalized().len(), trend.periods().len());
            assert!(trend.periods().windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn normalization_and_smoothing() {
        // Linear data goes through a first-degree filter unchanged
        let growing = (1..=20).map(|i| i * 100).collect::<Vec<_>>();
        let dataset = dataset(&[("Go", &growing[..])]);
        let trends = build(&dataset, &TrendsConfig::default());
        let go = &trends[0];
        for ((count, share), raw) in go.counts().iter().zip(go.normalized()).zip(&growing) {
            assert!((count - *raw as f64).abs() < 1e-6);
            assert!((share - *raw as f64 / 50_000.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ranked_by_latest_share() {
        // Python is bigger overall, but Go ends up ahead
        let go = (1..=20).map(|i| i * 100).collect::<Vec<_>>();
        let python = (1..=20).map(|i| 5000 - i * 200).collect::<Vec<_>>();
        let dataset = dataset(&[
            ("Python", &python[..]),
            ("Go", &go[..]),
            ("Java", &[1500; 20][..]),
            ("C", &[1500; 20][..]),
        ]);
        let trends = build(&dataset, &TrendsConfig::default());
        let names = trends.iter().map(Trend::category).collect::<Vec<_>>();
        assert_eq!(names, ["Go", "C", "Java", "Python"]);
        assert!(trends
            .windows(2)
            .all(|w| w[0].latest_share() >= w[1].latest_share()));
    }

    #[test]
    fn monthly_active_user_trend() {
        let dataset = dataset(&[]);
        let mau = denominator_trend(&dataset, &TrendsConfig::default()).unwrap();
        assert_eq!(mau.category(), MAU);
        assert_eq!(mau.periods().len(), 30);
        assert!(mau.counts().iter().all(|&c| (c - 50_000.0).abs() < 1e-6));
        assert!(mau.normalized().iter().all(|&n| n == 1.0));
    }
}
