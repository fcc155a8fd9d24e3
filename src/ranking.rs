//! Language ranking, as published

use crate::trends::Trend;
use serde::Deserialize;
use std::collections::HashSet;
use unicase::UniCase;

/// Categories that never make it into the published ranking
///
/// Names are compared case-insensitively, as the archive is not consistent
/// about the casing of some language names (e.g. "VimL" vs "Viml").
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(from = "Vec<Box<str>>")]
pub struct Denylist(HashSet<UniCase<Box<str>>>);
//
impl Denylist {
    /// Truth that a category is excluded from the ranking
    pub fn contains(&self, category: &str) -> bool {
        self.0.contains(&UniCase::new(category.into()))
    }
}
//
impl From<Vec<Box<str>>> for Denylist {
    fn from(categories: Vec<Box<str>>) -> Self {
        Self(categories.into_iter().map(UniCase::new).collect())
    }
}
//
impl Default for Denylist {
    /// Placeholders for unidentified languages, the denominator, and what we
    /// don't consider to be actual programming languages
    fn default() -> Self {
        [
            "Unknown",
            "Missing",
            "None",
            "MAU",
            "CSS",
            "TeX",
            "HTML",
            "XML",
            "Makefile",
            "CMake",
            "Vue",
            "Vim",
            "VimL",
            "Vim script",
            "Emacs",
            "Emacs Lisp",
            "Arduino",
            "Visual",
            "Batchfile",
            "XSLT",
        ]
        .into_iter()
        .map(Box::<str>::from)
        .collect::<Vec<_>>()
        .into()
    }
}

/// Position of a trend within the ranking
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ranked<'trends> {
    /// 1-based rank
    pub rank: usize,

    /// Ranked trend
    pub trend: &'trends Trend,
}

/// Rank trends, which must already be sorted by decreasing popularity, after
/// removing denylisted categories
pub fn rank<'trends>(trends: &'trends [Trend], denylist: &Denylist) -> Vec<Ranked<'trends>> {
    trends
        .iter()
        .filter(|trend| !denylist.contains(trend.category()))
        .enumerate()
        .map(|(idx, trend)| Ranked {
            rank: idx + 1,
            trend,
        })
        .collect()
}
