use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{Result, SicoError};

const ENGLISH_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Outcome of translating the month part of a `"<Mon>-<dd>"` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDate {
    /// The month was found in the alias table and replaced.
    Translated(String),
    /// The month already is an English abbreviation.
    English(String),
    /// Not in the table and not English; returned unchanged.
    Unrecognized(String),
}

impl NormalizedDate {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Translated(s) | Self::English(s) | Self::Unrecognized(s) => s,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

pub fn normalize_month_day(aliases: &BTreeMap<String, String>, raw: &str) -> NormalizedDate {
    let raw = raw.trim();
    let Some((month, day)) = raw.split_once('-') else {
        return NormalizedDate::Unrecognized(raw.to_string());
    };
    if let Some(english) = aliases.get(month) {
        return NormalizedDate::Translated(format!("{english}-{day}"));
    }
    if ENGLISH_MONTHS.contains(&month) {
        NormalizedDate::English(raw.to_string())
    } else {
        NormalizedDate::Unrecognized(raw.to_string())
    }
}

/// Month/day normalization policy shared by every transform in a run.
#[derive(Debug, Clone)]
pub struct DateContext<'a> {
    pub aliases: &'a BTreeMap<String, String>,
    pub strict: bool,
}

impl DateContext<'_> {
    /// Normalize `raw` and attach `year`, applying the strict/lenient policy
    /// for months missing from the alias table.
    pub fn resolve(&self, year: i32, raw: &str) -> Result<NaiveDate> {
        let normalized = normalize_month_day(self.aliases, raw);
        if !normalized.is_recognized() {
            if self.strict {
                return Err(SicoError::UnknownMonth(raw.trim().to_string()));
            }
            tracing::warn!(value = raw, "month abbreviation not recognized, passing through");
        }
        build_date(year, normalized.as_str())
    }
}

pub fn build_date(year: i32, month_day: &str) -> Result<NaiveDate> {
    let text = format!("{year}-{month_day}");
    NaiveDate::parse_from_str(&text, "%Y-%b-%d").map_err(|_| SicoError::InvalidDate(text))
}
