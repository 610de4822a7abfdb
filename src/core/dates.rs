//! Canonical date keys for distribution records.
//!
//! Every date in a distribution table is keyed by the canonical
//! `MM/DD/YYYY` form. The fund files mix `MM/DD/YYYY`, `M/D/YY` and the
//! occasional spelled-out date, so normalization has to happen before a
//! row can land in the store.

use chrono::NaiveDate;
use tracing::debug;

/// How a two-digit year expands to four digits. The fund files disagree:
/// the money-market listings always mean 20YY, while older dividend
/// records used a sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearPivot {
    /// `YY` always becomes `20YY`.
    #[default]
    Always2000,
    /// `YY` below the pivot becomes `20YY`, everything else `19YY`.
    Sliding(i32),
}

impl YearPivot {
    fn expand(&self, two_digit: i32) -> i32 {
        match self {
            YearPivot::Always2000 => 2000 + two_digit,
            YearPivot::Sliding(pivot) => {
                if two_digit < *pivot {
                    2000 + two_digit
                } else {
                    1900 + two_digit
                }
            }
        }
    }
}

/// Formats tried when a token is not slash-delimited.
const FALLBACK_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d-%b-%Y"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    pivot: YearPivot,
}

impl DateNormalizer {
    pub fn new(pivot: YearPivot) -> Self {
        DateNormalizer { pivot }
    }

    /// Converts a raw date token to the canonical `MM/DD/YYYY` key.
    ///
    /// Returns `None` when the token holds no recognizable calendar
    /// date; the caller drops the row and keeps going.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let token = raw.trim();
        if token.is_empty() {
            return None;
        }

        if let Some(date) = self.parse_slashed(token) {
            return Some(canonical_key(date));
        }

        for format in FALLBACK_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(token, format) {
                return Some(canonical_key(date));
            }
        }

        debug!(token, "dropping row with unrecognizable date");
        None
    }

    fn parse_slashed(&self, token: &str) -> Option<NaiveDate> {
        let mut parts = token.splitn(3, '/');
        let month: u32 = parts.next()?.trim().parse().ok()?;
        let day: u32 = parts.next()?.trim().parse().ok()?;
        let year_token = parts.next()?.trim();
        let year = match year_token.len() {
            4 => year_token.parse().ok()?,
            1 | 2 => self.pivot.expand(year_token.parse().ok()?),
            _ => return None,
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// The canonical `MM/DD/YYYY` key for a date.
pub fn canonical_key(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Parses a canonical key back to a date, for chronological ordering.
pub fn parse_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%m/%d/%Y").ok()
}
