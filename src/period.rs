//! Calendar months, the time axis of every series

use crate::Result;
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Calendar year and month
///
/// Periods are ordered chronologically, which is what the derived ordering
/// gives us thanks to the field order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Period {
    /// Year of the Gregorian calendar
    year: i32,

    /// Month of the year, from 1 to 12
    month: u32,
}
//
impl Period {
    /// Build a period, checking that the month is valid
    pub fn new(year: i32, month: u32) -> Result<Self> {
        anyhow::ensure!(
            (1..=12).contains(&month),
            "month {month} of year {year} is not a calendar month"
        );
        Ok(Self { year, month })
    }

    /// Period that a certain day belongs to
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First period whose data cannot be trusted to be complete
    ///
    /// Archive data for a given day is only processed once that day is over,
    /// so the month that contains yesterday is still being filled in. This
    /// holds uniformly across year boundaries: on January 1st, December of the
    /// previous year is the incomplete period.
    pub fn first_incomplete(today: NaiveDate) -> Self {
        Self::containing(today.pred_opt().unwrap_or(today))
    }

    /// Next calendar month
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                month: self.month + 1,
                ..self
            }
        }
    }

    /// Iterate over periods from this one (included) to `end` (excluded)
    pub fn until(self, end: Period) -> impl Iterator<Item = Period> {
        std::iter::successors(Some(self), |period| Some(period.next()))
            .take_while(move |period| *period < end)
    }

    /// Directory where the archive stores data about this period
    pub fn data_dir(&self, archive: &Path) -> PathBuf {
        archive
            .join(format!("{:04}", self.year))
            .join(format!("{:02}", self.month))
    }
}
//
impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
//
impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let context = || format!("parsing {s:?} as a YYYY-MM period");
        let (year, month) = s.trim().split_once('-').with_context(context)?;
        let year = year.parse::<i32>().with_context(context)?;
        let month = month.parse::<u32>().with_context(context)?;
        Self::new(year, month).with_context(context)
    }
}
//
impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e: anyhow::Error| de::Error::custom(format!("{e:#}")))
    }
}
//
impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    #[test]
    fn chronological_order() {
        assert!(period(2014, 12) < period(2015, 1));
        assert!(period(2015, 1) < period(2015, 2));
        assert_eq!(period(2014, 12).next(), period(2015, 1));
        assert_eq!(period(2015, 6).next(), period(2015, 7));
    }

    #[test]
    fn invalid_month() {
        assert!(Period::new(2015, 0).is_err());
        assert!(Period::new(2015, 13).is_err());
    }

    #[test]
    fn text_form() {
        assert_eq!(period(2015, 3).to_string(), "2015-03");
        assert_eq!("2015-03".parse::<Period>().unwrap(), period(2015, 3));
        assert!("2015".parse::<Period>().is_err());
        assert!("2015-xx".parse::<Period>().is_err());
    }

    #[test]
    fn range_excludes_end() {
        let periods = period(2014, 11).until(period(2015, 2)).collect::<Vec<_>>();
        assert_eq!(
            periods,
            [period(2014, 11), period(2014, 12), period(2015, 1)]
        );
        assert_eq!(period(2015, 2).until(period(2015, 2)).count(), 0);
    }

    #[test]
    fn incomplete_month_boundary() {
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(Period::first_incomplete(day(2016, 5, 17)), period(2016, 5));
        assert_eq!(Period::first_incomplete(day(2016, 5, 1)), period(2016, 4));
        assert_eq!(Period::first_incomplete(day(2017, 1, 1)), period(2016, 12));
    }

    #[test]
    fn archive_layout() {
        let dir = period(2015, 3).data_dir(Path::new("/archive"));
        assert_eq!(dir, Path::new("/archive/2015/03"));
    }
}
