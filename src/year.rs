//! Release-year normalization.
//!
//! Raw `release_date` cells come in many shapes (`2020-06-01`, `2018/07/15`,
//! `2022-05`, `2021-09-15 12:45:35`, empty, garbage). [`extract_year`] maps
//! every one of them to a [`YearToken`]: either a 4-digit year or `Missing`.
//! It never fails.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::{Serialize, Serializer};

use crate::record::MovieRecord;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y"];

// Year-month inputs are completed with a first day before parsing.
const YEAR_MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m"];

const NULL_MARKERS: &[&str] = &["nan", "null", "none", "nat"];

/// A normalized release year: four ASCII digits, or missing.
///
/// Years sort chronologically and `Missing` sorts after every year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum YearToken {
    Year(String),
    Missing,
}

impl YearToken {
    pub fn is_missing(&self) -> bool {
        matches!(self, YearToken::Missing)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            YearToken::Year(y) => Some(y),
            YearToken::Missing => None,
        }
    }
}

impl fmt::Display for YearToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearToken::Year(y) => f.pad(y),
            YearToken::Missing => f.pad("missing"),
        }
    }
}

impl Serialize for YearToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            YearToken::Year(y) => serializer.serialize_str(y),
            YearToken::Missing => serializer.serialize_none(),
        }
    }
}

///Extract the release year from a date-like string.
///Returns `YearToken::Missing` for absent, empty or unparseable input.
/// # Example
/// ```
/// use movie_stats::{YearToken, extract_year};
/// assert_eq!(extract_year(Some("2020-06-01")), YearToken::Year("2020".to_string()));
/// assert_eq!(extract_year(Some("2022-05")), YearToken::Year("2022".to_string()));
/// assert_eq!(extract_year(Some("invalid-date")), YearToken::Missing);
/// assert_eq!(extract_year(None), YearToken::Missing);
/// ```
pub fn extract_year(input: Option<&str>) -> YearToken {
    let Some(raw) = input.map(str::trim) else {
        return YearToken::Missing;
    };
    if raw.is_empty() || NULL_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return YearToken::Missing;
    }
    match parse_year(raw) {
        Some(year) if (1000..=9999).contains(&year) => YearToken::Year(format!("{year:04}")),
        _ => YearToken::Missing,
    }
}

/// Year for every record, in input order.
pub fn annotate_years(records: &[MovieRecord]) -> Vec<YearToken> {
    records
        .par_iter()
        .map(|r| extract_year(r.release_date.as_deref()))
        .collect()
}

/// Number of movies per release year, `Missing` included.
/// Sorted by count descending, then by year.
pub fn count_by_release_year(records: &[MovieRecord]) -> Vec<(YearToken, usize)> {
    let mut frequency: HashMap<YearToken, usize> = HashMap::new();
    for year in annotate_years(records) {
        *frequency.entry(year).or_insert(0) += 1;
    }
    let mut counted: Vec<(YearToken, usize)> = frequency.into_iter().collect();
    counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counted
}

// ---- Internal helpers ----

fn parse_year(raw: &str) -> Option<i32> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.year());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.year());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d.year());
        }
    }
    for fmt in YEAR_MONTH_FORMATS {
        let completed = format!("{raw}-01");
        let fmt = format!("{fmt}-%d");
        if let Ok(d) = NaiveDate::parse_from_str(&completed, &fmt) {
            return Some(d.year());
        }
    }
    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok();
    }
    None
}
