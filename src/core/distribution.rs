//! Per-date distribution records and the per-ticker store they roll up
//! into.

use crate::core::dates;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// One fund's cash distribution on a single date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionRecord {
    /// NAV used to reinvest the distribution. Always positive; 1.00 when
    /// unknown or when the fund has a fixed NAV.
    pub reinvest_nav: Decimal,
    /// Sum of every dividend/capital-gain amount (or daily rate)
    /// recognized for this date.
    pub total_distributions: Decimal,
}

impl DistributionRecord {
    pub fn new(reinvest_nav: Decimal, total_distributions: Decimal) -> Self {
        DistributionRecord {
            reinvest_nav,
            total_distributions,
        }
    }

    /// A money-market daily rate: the NAV is pinned to 1.00.
    pub fn money_market(rate: Decimal) -> Self {
        DistributionRecord {
            reinvest_nav: Decimal::ONE,
            total_distributions: rate,
        }
    }
}

impl Default for DistributionRecord {
    fn default() -> Self {
        DistributionRecord {
            reinvest_nav: Decimal::ONE,
            total_distributions: Decimal::ZERO,
        }
    }
}

/// Distribution records for one fund, keyed by canonical `MM/DD/YYYY`
/// date. One entry per date: repeated rows for a date merge by summing
/// amounts, never by overwriting.
#[derive(Debug, Clone, Default)]
pub struct DistributionTable {
    entries: HashMap<String, DistributionRecord>,
}

impl DistributionTable {
    pub fn new() -> Self {
        DistributionTable::default()
    }

    /// Inserts a record, merging with any existing entry for the date:
    /// amounts sum, and a non-default reinvest NAV replaces the stored
    /// one (the later row wins).
    pub fn record(&mut self, date_key: &str, incoming: DistributionRecord) {
        match self.entries.get_mut(date_key) {
            Some(existing) => {
                existing.total_distributions += incoming.total_distributions;
                if incoming.reinvest_nav != Decimal::ONE {
                    existing.reinvest_nav = incoming.reinvest_nav;
                }
            }
            None => {
                self.entries.insert(date_key.to_string(), incoming);
            }
        }
    }

    pub fn get(&self, date_key: &str) -> Option<&DistributionRecord> {
        self.entries.get(date_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in chronological order of their date keys.
    pub fn sorted(&self) -> Vec<(&str, &DistributionRecord)> {
        let mut rows: Vec<_> = self
            .entries
            .iter()
            .map(|(key, record)| (key.as_str(), record))
            .collect();
        rows.sort_by_key(|(key, _)| dates::parse_key(key));
        rows
    }

    /// Sum of all distributions in the table.
    pub fn total(&self) -> Decimal {
        self.entries
            .values()
            .map(|record| record.total_distributions)
            .sum()
    }
}

/// Distribution tables for all loaded funds, keyed by ticker. Built
/// fresh per load and handed to the view layer read-only.
#[derive(Debug, Clone, Default)]
pub struct DistributionStore {
    funds: HashMap<String, DistributionTable>,
}

impl DistributionStore {
    pub fn new() -> Self {
        DistributionStore::default()
    }

    pub fn insert(&mut self, ticker: String, table: DistributionTable) {
        self.funds.insert(ticker, table);
    }

    pub fn table(&self, ticker: &str) -> Option<&DistributionTable> {
        self.funds.get(ticker)
    }

    /// The table for a ticker, created empty on first use during a parse.
    pub fn table_mut(&mut self, ticker: &str) -> &mut DistributionTable {
        self.funds.entry(ticker.to_string()).or_default()
    }

    pub fn remove(&mut self, ticker: &str) -> Option<DistributionTable> {
        self.funds.remove(ticker)
    }

    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<_> = self.funds.keys().map(String::as_str).collect();
        tickers.sort_unstable();
        tickers
    }

    /// All funds with a distribution on the given canonical date.
    pub fn on_date(&self, date_key: &str) -> HashMap<&str, &DistributionRecord> {
        self.funds
            .iter()
            .filter_map(|(ticker, table)| {
                table
                    .get(date_key)
                    .map(|record| (ticker.as_str(), record))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_duplicate_dates_merge_by_summing() {
        let mut table = DistributionTable::new();
        table.record("01/02/2024", DistributionRecord::money_market(dec("0.0001")));
        table.record("01/02/2024", DistributionRecord::money_market(dec("0.0002")));

        assert_eq!(table.len(), 1);
        let record = table.get("01/02/2024").unwrap();
        assert_eq!(record.total_distributions, dec("0.0003"));
        assert_eq!(record.reinvest_nav, Decimal::ONE);
    }

    #[test]
    fn test_merge_keeps_non_default_nav() {
        let mut table = DistributionTable::new();
        table.record("01/15/2024", DistributionRecord::new(dec("12.34"), dec("0.10")));
        table.record("01/15/2024", DistributionRecord::money_market(dec("0.05")));

        let record = table.get("01/15/2024").unwrap();
        assert_eq!(record.reinvest_nav, dec("12.34"));
        assert_eq!(record.total_distributions, dec("0.15"));
    }

    #[test]
    fn test_merge_later_non_default_nav_wins() {
        let mut table = DistributionTable::new();
        table.record("01/15/2024", DistributionRecord::new(dec("12.34"), dec("0.10")));
        table.record("01/15/2024", DistributionRecord::new(dec("12.56"), dec("0.05")));

        let record = table.get("01/15/2024").unwrap();
        assert_eq!(record.reinvest_nav, dec("12.56"));
        assert_eq!(record.total_distributions, dec("0.15"));
    }

    #[test]
    fn test_sorted_is_chronological() {
        let mut table = DistributionTable::new();
        table.record("02/01/2024", DistributionRecord::default());
        table.record("12/15/2023", DistributionRecord::default());
        table.record("01/02/2024", DistributionRecord::default());

        let keys: Vec<_> = table.sorted().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["12/15/2023", "01/02/2024", "02/01/2024"]);
    }

    #[test]
    fn test_table_total() {
        let mut table = DistributionTable::new();
        table.record("01/02/2024", DistributionRecord::money_market(dec("0.0001")));
        table.record("01/03/2024", DistributionRecord::money_market(dec("0.0002")));
        assert_eq!(table.total(), dec("0.0003"));
    }

    #[test]
    fn test_on_date_returns_only_matching_funds() {
        let mut store = DistributionStore::new();

        let mut afaxx = DistributionTable::new();
        afaxx.record("01/02/2024", DistributionRecord::money_market(dec("0.0003")));
        store.insert("AFAXX".to_string(), afaxx);

        let mut ancfx = DistributionTable::new();
        ancfx.record("01/15/2024", DistributionRecord::new(dec("12.34"), dec("0.15")));
        store.insert("ANCFX".to_string(), ancfx);

        let on_date = store.on_date("01/02/2024");
        assert_eq!(on_date.len(), 1);
        assert_eq!(
            on_date.get("AFAXX").unwrap().total_distributions,
            dec("0.0003")
        );
        assert!(store.on_date("03/03/2024").is_empty());
    }
}
