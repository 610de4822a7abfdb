use std::collections::HashSet;

/// How a fund's NAV behaves, which decides the distribution-file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundKind {
    /// Fixed $1.00 NAV; the file lists daily rates.
    MoneyMarket,
    /// Priced NAV; the file lists dated dividend and capital-gain rows.
    Mutual,
}

/// Maps tickers to their [`FundKind`] from a configured set of fixed-NAV
/// tickers. Unknown tickers are treated as regular mutual funds.
#[derive(Debug, Clone)]
pub struct FundClassifier {
    money_market: HashSet<String>,
}

impl FundClassifier {
    pub fn new<I, S>(money_market_tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        FundClassifier {
            money_market: money_market_tickers
                .into_iter()
                .map(|ticker| ticker.as_ref().trim().to_uppercase())
                .collect(),
        }
    }

    pub fn classify(&self, ticker: &str) -> FundKind {
        if self.money_market.contains(&ticker.trim().to_uppercase()) {
            FundKind::MoneyMarket
        } else {
            FundKind::Mutual
        }
    }
}

impl Default for FundClassifier {
    fn default() -> Self {
        FundClassifier::new(["AFAXX"])
    }
}
