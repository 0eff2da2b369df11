// Review filters: narrow an ingested set by app version or recency.
//
// These run before analysis so every cluster view sees the same subset.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};

use super::Review;

/// Label used for reviews that carry no version.
pub const UNKNOWN_VERSION: &str = "Desconhecida";

/// Keep reviews written against `version`. `"all"` keeps everything and
/// reviews without a version match [`UNKNOWN_VERSION`].
pub fn filter_by_version(reviews: &[Review], version: &str) -> Vec<Review> {
    if version == "all" {
        return reviews.to_vec();
    }
    reviews
        .iter()
        .filter(|r| r.version.as_deref().unwrap_or(UNKNOWN_VERSION) == version)
        .cloned()
        .collect()
}

/// Distinct versions present in the set, newest first, unknown last.
pub fn distinct_versions(reviews: &[Review]) -> Vec<String> {
    let mut versions: Vec<String> = Vec::new();
    for review in reviews {
        let v = review.version.as_deref().unwrap_or(UNKNOWN_VERSION);
        if !versions.iter().any(|seen| seen == v) {
            versions.push(v.to_string());
        }
    }

    versions.sort_by(|a, b| match (a == UNKNOWN_VERSION, b == UNKNOWN_VERSION) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare_versions(b, a),
    });
    versions
}

/// Compare two version strings so that "1.10" sorts after "1.9".
///
/// Runs of digits compare numerically, everything else compares as text.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a).into_iter();
    let mut right = chunks(b).into_iter();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Split into alternating digit / non-digit runs.
fn chunks(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev_digit: Option<bool> = None;
    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        if let Some(p) = prev_digit {
            if p != is_digit {
                out.push(&s[start..i]);
                start = i;
            }
        }
        prev_digit = Some(is_digit);
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

/// Recency windows offered on top of the one-year ingestion window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    SevenDays,
    FifteenDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::SevenDays => "7days",
            DateRange::FifteenDays => "15days",
            DateRange::OneMonth => "1month",
            DateRange::ThreeMonths => "3months",
            DateRange::SixMonths => "6months",
            DateRange::OneYear => "1year",
        }
    }

    /// Earliest date still inside the window, relative to `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::SevenDays => now.checked_sub_signed(Duration::days(7)),
            DateRange::FifteenDays => now.checked_sub_signed(Duration::days(15)),
            DateRange::OneMonth => now.checked_sub_months(Months::new(1)),
            DateRange::ThreeMonths => now.checked_sub_months(Months::new(3)),
            DateRange::SixMonths => now.checked_sub_months(Months::new(6)),
            DateRange::OneYear => now.checked_sub_months(Months::new(12)),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7days" => Ok(DateRange::SevenDays),
            "15days" => Ok(DateRange::FifteenDays),
            "1month" => Ok(DateRange::OneMonth),
            "3months" => Ok(DateRange::ThreeMonths),
            "6months" => Ok(DateRange::SixMonths),
            "1year" => Ok(DateRange::OneYear),
            other => Err(format!(
                "unknown date range '{other}' (expected 7days, 15days, 1month, 3months, 6months or 1year)"
            )),
        }
    }
}

/// Keep reviews dated inside `range`. `OneYear` keeps everything since
/// ingestion already bounds the set to a year.
pub fn filter_by_date_range(reviews: &[Review], range: DateRange, now: DateTime<Utc>) -> Vec<Review> {
    if range == DateRange::OneYear {
        return reviews.to_vec();
    }
    match range.cutoff(now) {
        Some(cutoff) => reviews.iter().filter(|r| r.date >= cutoff).cloned().collect(),
        None => reviews.to_vec(),
    }
}
