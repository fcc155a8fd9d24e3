//! Scanning of the monthly extracts of the GitHub Archive
//!
//! Upstream extraction tools leave one directory per month in the archive,
//! e.g. `2015/03/`, holding two small text files:
//!
//! - The total number of monthly active users, as the first whitespace
//!   separated token of the file.
//! - The number of monthly active users of each language, one
//!   `<count> <language name>` pair per line. Language names may contain
//!   spaces, e.g. `Jupyter Notebook`.

use crate::{
    anomaly::Anomaly,
    config::TrendsConfig,
    dataset::{builder::DatasetBuilder, Dataset},
    period::Period,
    progress::ProgressReport,
    Category, Count, Result,
};
use std::{fs, path::Path, str::FromStr};

/// Line from a per-language count file
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Entry {
    /// Number of monthly active users
    pub count: Count,

    /// Language name, with runs of whitespace collapsed into single spaces
    pub category: Category,
}
//
impl FromStr for Entry {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, String> {
        let mut tokens = line.split_whitespace();
        let count = tokens.next().ok_or("line is empty")?;
        let count = count
            .parse::<Count>()
            .map_err(|e| format!("invalid count {count:?} ({e})"))?;
        let category = tokens.collect::<Vec<_>>().join(" ");
        if category.is_empty() {
            return Err("missing language name".into());
        }
        Ok(Self {
            count,
            category: category.into(),
        })
    }
}

/// Scan the archive from the configured epoch up to `end` (excluded)
///
/// Only a missing archive is fatal. Missing or damaged monthly files are
/// logged, recorded as anomalies, and skipped.
pub fn scan(
    archive: &Path,
    config: &TrendsConfig,
    end: Period,
    report: &ProgressReport,
) -> Result<(Dataset, Vec<Anomaly>)> {
    anyhow::ensure!(
        archive.is_dir(),
        "archive directory {} does not exist",
        archive.display()
    );
    let periods = config.epoch.until(end).collect::<Vec<_>>();
    log::info!(
        "Scanning {} months of data from {} to {end} (excluded)",
        periods.len(),
        config.epoch
    );
    let progress = report.add("Scanning monthly data", periods.len());

    let mut dataset = DatasetBuilder::new(config.min_denominator);
    for period in periods {
        scan_period(archive, config, period, &mut dataset);
        progress.make_progress(1);
    }
    Ok(dataset.finish())
}

/// Integrate the data from one month into the dataset
fn scan_period(
    archive: &Path,
    config: &TrendsConfig,
    period: Period,
    dataset: &mut DatasetBuilder,
) {
    let dir = period.data_dir(archive);

    // Without a usable denominator, nothing from this month can be used
    let denominator = match read_denominator(&dir.join(&*config.denominator_file), period) {
        Ok(denominator) => denominator,
        Err(anomaly) => {
            dataset.record(anomaly);
            return;
        }
    };
    if !dataset.add_denominator(period, denominator) {
        return;
    }

    // Per-language counts are optional, a month without them still says
    // something about the total number of users
    let counts_path = dir.join(&*config.counts_file);
    let counts = match fs::read_to_string(&counts_path) {
        Ok(counts) => counts,
        Err(e) => {
            dataset.record(Anomaly::MissingCounts {
                period,
                reason: e.to_string().into(),
            });
            return;
        }
    };
    for (idx, line) in counts.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Entry>() {
            Ok(Entry { count, category }) => {
                dataset.add_observation(category, period, count);
            }
            Err(reason) => dataset.record(Anomaly::MalformedLine {
                path: counts_path.clone().into(),
                line: idx + 1,
                reason: reason.into(),
            }),
        }
    }
}

/// Read the number of monthly active users from a denominator file
fn read_denominator(path: &Path, period: Period) -> Result<Count, Anomaly> {
    let text = fs::read_to_string(path).map_err(|e| Anomaly::MissingDenominator {
        period,
        reason: e.to_string().into(),
    })?;
    let malformed = |reason: String| Anomaly::MalformedDenominator {
        path: path.into(),
        reason: reason.into(),
    };
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| malformed("file is empty".into()))?;
    token
        .parse::<Count>()
        .map_err(|e| malformed(format!("invalid user count {token:?} ({e})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trends;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn period(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    /// Archive in a temporary directory
    struct Archive(TempDir);
    //
    impl Archive {
        fn new() -> Self {
            Self(tempfile::tempdir().unwrap())
        }

        fn path(&self) -> &Path {
            self.0.path()
        }

        fn write(&self, period: Period, file: &str, contents: &str) -> PathBuf {
            let dir = period.data_dir(self.path());
            fs::create_dir_all(&dir).unwrap();
            let path = dir.join(file);
            fs::write(&path, contents).unwrap();
            path
        }

        fn month(&self, period: Period, mau: &str, counts: Option<&str>) {
            self.write(period, "mau.txt", mau);
            if let Some(counts) = counts {
                self.write(period, "language_mau.txt", counts);
            }
        }
    }

    fn config(epoch: Period) -> TrendsConfig {
        TrendsConfig {
            epoch,
            ..TrendsConfig::default()
        }
    }

    fn scan_archive(archive: &Archive, epoch: Period, end: Period) -> (Dataset, Vec<Anomaly>) {
        scan(
            archive.path(),
            &config(epoch),
            end,
            &ProgressReport::hidden(),
        )
        .unwrap()
    }

    #[test]
    fn entry_parsing() {
        let entry = "120 Python".parse::<Entry>().unwrap();
        assert_eq!(entry.count, 120);
        assert_eq!(&*entry.category, "Python");
        let entry = " 42\tJupyter   Notebook \n".parse::<Entry>().unwrap();
        assert_eq!(&*entry.category, "Jupyter Notebook");
        assert!("Python".parse::<Entry>().is_err());
        assert!("-3 Python".parse::<Entry>().is_err());
        assert!("12".parse::<Entry>().is_err());
    }

    #[test]
    fn missing_archive_is_fatal() {
        let archive = Archive::new();
        let missing = archive.path().join("nope");
        let config = TrendsConfig::default();
        let end = period(2012, 1);
        assert!(scan(&missing, &config, end, &ProgressReport::hidden()).is_err());
    }

    #[test]
    fn empty_archive() {
        let archive = Archive::new();
        let (dataset, anomalies) = scan_archive(&archive, period(2015, 1), period(2015, 4));
        assert!(dataset.is_empty());
        assert_eq!(anomalies.len(), 3);
        assert!(anomalies.iter().all(|a| !a.is_warning()));
        assert!(trends::build(&dataset, &TrendsConfig::default()).is_empty());
    }

    #[test]
    fn empty_period_range() {
        let archive = Archive::new();
        archive.month(period(2015, 1), "50000", Some("10 Go\n"));
        let (dataset, anomalies) = scan_archive(&archive, period(2015, 1), period(2015, 1));
        assert!(dataset.is_empty());
        assert!(anomalies.is_empty());
        let (dataset, anomalies) = scan_archive(&archive, period(2015, 1), period(2014, 6));
        assert!(dataset.is_empty());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn damaged_months_are_skipped() {
        let archive = Archive::new();
        archive.month(period(2015, 1), "50000 users", Some("10 Go\n"));
        archive.month(period(2015, 2), "lots", Some("10 Go\n"));
        archive.month(period(2015, 3), "", Some("10 Go\n"));
        archive.month(period(2015, 4), "900", Some("10 Go\n"));
        archive.month(period(2015, 5), "60000", None);
        archive.month(
            period(2015, 6),
            "70000",
            Some("10 Go\nten Rust\n\n7\n11 Rust\n"),
        );

        let (dataset, anomalies) = scan_archive(&archive, period(2015, 1), period(2015, 8));
        let accepted = dataset.denominators().collect::<Vec<_>>();
        assert_eq!(
            accepted,
            [
                (period(2015, 1), 50_000),
                (period(2015, 5), 60_000),
                (period(2015, 6), 70_000),
            ]
        );
        assert_eq!(
            dataset.series("Go"),
            Some(&[(period(2015, 1), 10), (period(2015, 6), 10)][..])
        );
        assert_eq!(dataset.series("Rust"), Some(&[(period(2015, 6), 11)][..]));

        let lines = anomalies
            .iter()
            .filter_map(|anomaly| match anomaly {
                Anomaly::MalformedLine { line, .. } => Some(*line),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(lines, [2, 4]);
        assert!(anomalies.contains(&Anomaly::UnreliableDenominator {
            period: period(2015, 4),
            denominator: 900,
        }));
        assert!(anomalies
            .iter()
            .any(|a| matches!(a, Anomaly::MissingCounts { .. })));
        assert_eq!(
            anomalies
                .iter()
                .filter(|a| matches!(a, Anomaly::MalformedDenominator { .. }))
                .count(),
            2
        );
        let missing_months = anomalies
            .iter()
            .filter_map(|anomaly| match anomaly {
                Anomaly::MissingDenominator { period, .. } => Some(*period),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(missing_months, [period(2015, 7)]);
    }

    #[test]
    fn duplicate_language_in_a_month() {
        let archive = Archive::new();
        archive.month(
            period(2015, 1),
            "50000",
            Some("120 Python\n80 Python\n30 Go\n"),
        );
        let (dataset, anomalies) = scan_archive(&archive, period(2015, 1), period(2015, 2));
        assert_eq!(
            dataset.series("Python"),
            Some(&[(period(2015, 1), 120)][..])
        );
        assert_eq!(dataset.series("Go"), Some(&[(period(2015, 1), 30)][..]));
        assert_eq!(
            anomalies,
            [Anomaly::DuplicateCategory {
                period: period(2015, 1),
                category: "Python".into(),
            }]
        );
        assert!(anomalies[0].is_warning());
    }

    #[test]
    fn end_to_end() {
        let archive = Archive::new();
        let months = period(2015, 1).until(period(2016, 3)).collect::<Vec<_>>();
        assert_eq!(months.len(), 14);
        for (idx, &month) in months.iter().enumerate() {
            let mau = 50_000 + 1_000 * idx as Count;
            let python = 120 + 10 * idx as Count;
            archive.month(
                month,
                &format!("{mau}\n"),
                Some(&format!("{python} Python\n5 Elm\n")),
            );
        }
        // Current month is still being filled in and must not be read
        archive.month(period(2016, 3), "10", Some("1 Python\n"));

        let (dataset, anomalies) = scan_archive(&archive, period(2014, 12), period(2016, 3));
        assert_eq!(anomalies.len(), 1);
        assert_eq!(dataset.denominator(period(2015, 1)), Some(50_000));

        let python = dataset.series("Python").unwrap();
        let shares = dataset.shares(python);
        assert_eq!(shares.len(), 14);
        assert_eq!(shares[0], 120.0 / 50_000.0);
        for ((&(month, count), share), idx) in python.iter().zip(&shares).zip(0..) {
            assert_eq!(month, months[idx]);
            assert_eq!(
                *share,
                count as f64 / (50_000 + 1_000 * idx as Count) as f64
            );
        }

        let config = config(period(2014, 12));
        let trends = trends::build(&dataset, &config);
        assert_eq!(trends.len(), 2);
        let python = trends
            .iter()
            .find(|trend| trend.category() == "Python")
            .unwrap();
        assert_eq!(python.periods(), &months[..]);
        assert_eq!(python.normalized().len(), 14);
        assert_eq!(python.counts().len(), 14);
        assert_eq!(trends[0].category(), "Python");
    }
}
