//! Fetch-and-parse boundary for distribution files.
//!
//! One fund's missing or broken file must never take down the others:
//! every fetch problem degrades to an empty table for that ticker.

use crate::core::dates::DateNormalizer;
use crate::core::distribution::{DistributionStore, DistributionTable};
use crate::core::fund::{FundClassifier, FundKind};
use crate::parse::DistributionParser;
use crate::providers::text_source::TextSource;
use futures::future::join_all;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How distribution files are laid out at the source: one file per
/// ticker, or one combined file with embedded ticker sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    #[default]
    PerTicker,
    Combined,
}

pub struct DistributionLoader<'a> {
    source: &'a dyn TextSource,
    classifier: &'a FundClassifier,
    dates: &'a DateNormalizer,
    mode: IngestMode,
    combined_file: String,
}

impl<'a> DistributionLoader<'a> {
    pub fn new(
        source: &'a dyn TextSource,
        classifier: &'a FundClassifier,
        dates: &'a DateNormalizer,
        mode: IngestMode,
        combined_file: &str,
    ) -> Self {
        DistributionLoader {
            source,
            classifier,
            dates,
            mode,
            combined_file: combined_file.to_string(),
        }
    }

    fn parser(&self) -> DistributionParser<'_> {
        DistributionParser::new(self.classifier, self.dates)
    }

    /// Per-ticker file names are keyed by fund type.
    fn identifier_for(&self, ticker: &str) -> String {
        match self.classifier.classify(ticker) {
            FundKind::MoneyMarket => format!("mmf_{}.txt", ticker.to_uppercase()),
            FundKind::Mutual => format!("div_{}.txt", ticker.to_uppercase()),
        }
    }

    /// Loads one fund's distribution table. Never fails: any fetch
    /// problem yields an empty table so sibling funds still render.
    pub async fn load(&self, ticker: &str) -> DistributionTable {
        let ticker = ticker.trim().to_uppercase();
        let identifier = match self.mode {
            IngestMode::PerTicker => self.identifier_for(&ticker),
            IngestMode::Combined => self.combined_file.clone(),
        };

        let text = match self.source.fetch_text(&identifier).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    ticker,
                    identifier,
                    error = %e,
                    "Distribution fetch failed; fund will render without data"
                );
                return DistributionTable::default();
            }
        };

        match self.mode {
            IngestMode::PerTicker => self.parser().parse_section(&ticker, &text),
            IngestMode::Combined => self
                .parser()
                .parse_combined(&text)
                .remove(&ticker)
                .unwrap_or_default(),
        }
    }

    /// Loads all funds concurrently and merges the disjoint per-ticker
    /// tables after the join. In combined mode the file is fetched and
    /// parsed once.
    pub async fn load_all(&self, tickers: &[String], progress: ProgressBar) -> DistributionStore {
        let mut store = DistributionStore::new();

        match self.mode {
            IngestMode::Combined => {
                let mut parsed = match self.source.fetch_text(&self.combined_file).await {
                    Ok(text) => self.parser().parse_combined(&text),
                    Err(e) => {
                        warn!(
                            identifier = %self.combined_file,
                            error = %e,
                            "Combined distribution fetch failed; funds will render without data"
                        );
                        DistributionStore::new()
                    }
                };
                for ticker in tickers {
                    let ticker = ticker.trim().to_uppercase();
                    let table = parsed.remove(&ticker).unwrap_or_default();
                    store.insert(ticker, table);
                    progress.inc(1);
                }
            }
            IngestMode::PerTicker => {
                let futures = tickers.iter().map(|ticker| {
                    let progress = progress.clone();
                    async move {
                        let table = self.load(ticker).await;
                        progress.inc(1);
                        (ticker.trim().to_uppercase(), table)
                    }
                });
                for (ticker, table) in join_all(futures).await {
                    store.insert(ticker, table);
                }
            }
        }

        store
    }
}
