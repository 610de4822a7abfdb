//! Distribution-file parser.
//!
//! The fund files are hand-maintained and drift between layouts:
//! money-market daily-rate listings vs. dated dividend/capital-gains
//! records, tab- vs comma-delimited rows, header-labelled vs purely
//! positional columns. The parser walks the raw text as a small state
//! machine, one ticker section at a time, and normalizes whatever it
//! recognizes into per-date [`DistributionRecord`]s. Rows it cannot make
//! sense of are dropped with a debug event; nothing at row level is an
//! error.

use crate::core::amount::clean_amount;
use crate::core::dates::DateNormalizer;
use crate::core::distribution::{DistributionRecord, DistributionStore, DistributionTable};
use crate::core::fund::{FundClassifier, FundKind};
use rust_decimal::Decimal;
use tracing::debug;

/// Field separator for one data row. Detected per line so a file that
/// mixes both keeps parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowDelimiter {
    Tab,
    Comma,
}

impl RowDelimiter {
    fn detect(line: &str) -> Self {
        if line.contains('\t') {
            RowDelimiter::Tab
        } else {
            RowDelimiter::Comma
        }
    }

    fn split(self, line: &str) -> Vec<&str> {
        let separator = match self {
            RowDelimiter::Tab => '\t',
            RowDelimiter::Comma => ',',
        };
        line.split(separator).map(str::trim).collect()
    }
}

/// Column positions resolved from a recognized header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSchema {
    date: usize,
    nav: Option<usize>,
    amounts: Vec<usize>,
}

impl HeaderSchema {
    /// Recognizes a mutual-fund header row such as
    /// `Record Date\tReinvest NAV\tDividend\tCap. Gains`.
    ///
    /// A header needs a date column plus at least one NAV or amount
    /// column; anything else is not a header.
    fn detect(line: &str) -> Option<Self> {
        let fields = RowDelimiter::detect(line).split(line);
        let mut date = None;
        let mut nav = None;
        let mut amounts = Vec::new();

        for (index, field) in fields.iter().enumerate() {
            let label = field.to_lowercase();
            if label.contains("nav") && nav.is_none() {
                nav = Some(index);
            } else if label.contains("dividend") || label.contains("gain") {
                amounts.push(index);
            } else if label.contains("date") && date.is_none() {
                date = Some(index);
            }
        }

        let date = date?;
        if nav.is_none() && amounts.is_empty() {
            return None;
        }
        Some(HeaderSchema { date, nav, amounts })
    }
}

/// How a mutual-fund data row maps to columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Columns identified by a header row.
    HeaderDriven(HeaderSchema),
    /// No header: date in the first column, NAV in the last numeric
    /// column, every numeric column in between summed as distributions.
    Positional,
}

/// A ticker section line is nothing but uppercase letters.
fn is_ticker_line(trimmed: &str) -> bool {
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_uppercase())
}

struct Section {
    ticker: String,
    kind: FundKind,
    mode: Option<ExtractionMode>,
}

pub struct DistributionParser<'a> {
    classifier: &'a FundClassifier,
    dates: &'a DateNormalizer,
}

impl<'a> DistributionParser<'a> {
    pub fn new(classifier: &'a FundClassifier, dates: &'a DateNormalizer) -> Self {
        DistributionParser { classifier, dates }
    }

    /// Parses a combined file with embedded ticker sections.
    pub fn parse_combined(&self, text: &str) -> DistributionStore {
        self.walk(text, None)
    }

    /// Parses a per-ticker file. The ticker is known up front; a leading
    /// ticker line in the file is tolerated but not required.
    pub fn parse_section(&self, ticker: &str, text: &str) -> DistributionTable {
        let ticker = ticker.trim().to_uppercase();
        let seed = Section {
            kind: self.classifier.classify(&ticker),
            ticker: ticker.clone(),
            mode: None,
        };
        let mut store = self.walk(text, Some(seed));
        store.remove(&ticker).unwrap_or_default()
    }

    fn walk(&self, text: &str, initial: Option<Section>) -> DistributionStore {
        let mut store = DistributionStore::new();
        let mut section = initial;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if is_ticker_line(trimmed) {
                section = Some(Section {
                    ticker: trimmed.to_string(),
                    kind: self.classifier.classify(trimmed),
                    mode: None,
                });
                continue;
            }

            let Some(section) = section.as_mut() else {
                debug!(line = trimmed, "skipping text outside any ticker section");
                continue;
            };

            match section.kind {
                FundKind::MoneyMarket => {
                    if let Some((key, record)) = self.money_market_row(trimmed) {
                        store.table_mut(&section.ticker).record(&key, record);
                    }
                }
                FundKind::Mutual => {
                    if section.mode.is_none() {
                        if let Some(schema) = HeaderSchema::detect(trimmed) {
                            section.mode = Some(ExtractionMode::HeaderDriven(schema));
                            continue;
                        }
                        section.mode = Some(ExtractionMode::Positional);
                    }
                    if let Some(mode) = &section.mode
                        && let Some((key, record)) = self.mutual_row(trimmed, mode)
                    {
                        store.table_mut(&section.ticker).record(&key, record);
                    }
                }
            }
        }

        store
    }

    /// A money-market data row: `rate <delimiter> date`. The NAV is
    /// pinned to 1.00; an unparseable rate contributes zero.
    fn money_market_row(&self, line: &str) -> Option<(String, DistributionRecord)> {
        let fields = RowDelimiter::detect(line).split(line);
        if fields.len() < 2 {
            debug!(line, "dropping money-market row without a date field");
            return None;
        }
        let key = self.dates.normalize(fields[1])?;
        let rate = clean_amount(fields[0]).unwrap_or(Decimal::ZERO);
        Some((key, DistributionRecord::money_market(rate)))
    }

    fn mutual_row(&self, line: &str, mode: &ExtractionMode) -> Option<(String, DistributionRecord)> {
        let fields = RowDelimiter::detect(line).split(line);
        match mode {
            ExtractionMode::HeaderDriven(schema) => {
                let key = self.dates.normalize(fields.get(schema.date)?)?;
                let nav = schema
                    .nav
                    .and_then(|index| fields.get(index).copied())
                    .and_then(clean_amount)
                    .filter(|nav| *nav > Decimal::ZERO)
                    .unwrap_or(Decimal::ONE);
                let total = schema
                    .amounts
                    .iter()
                    .filter_map(|index| fields.get(*index).copied().and_then(clean_amount))
                    .sum();
                Some((key, DistributionRecord::new(nav, total)))
            }
            ExtractionMode::Positional => {
                let key = self.dates.normalize(fields.first()?)?;
                let numerics: Vec<Decimal> =
                    fields[1..].iter().copied().filter_map(clean_amount).collect();
                let record = match numerics.split_last() {
                    Some((last, rest)) => {
                        let nav = if *last > Decimal::ZERO {
                            *last
                        } else {
                            Decimal::ONE
                        };
                        DistributionRecord::new(nav, rest.iter().copied().sum())
                    }
                    None => DistributionRecord::default(),
                };
                Some((key, record))
            }
        }
    }
}
