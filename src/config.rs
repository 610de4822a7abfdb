use crate::core::YearPivot;
use crate::loader::IngestMode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FundEntry {
    pub ticker: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DistributionSourceConfig {
    pub base_url: String,
    #[serde(default)]
    pub mode: IngestMode,
    #[serde(default = "default_combined_file")]
    pub combined_file: String,
}

fn default_combined_file() -> String {
    "distributions.txt".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QuoteProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    pub distributions: Option<DistributionSourceConfig>,
    pub quotes: Option<QuoteProviderConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            distributions: None,
            quotes: Some(QuoteProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DateConfig {
    /// Two-digit years below this value map to 20YY and the rest to
    /// 19YY. Unset means every two-digit year maps to 20YY.
    pub two_digit_year_pivot: Option<i32>,
}

impl DateConfig {
    pub fn year_pivot(&self) -> YearPivot {
        match self.two_digit_year_pivot {
            Some(pivot) => YearPivot::Sliding(pivot),
            None => YearPivot::Always2000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub funds: Vec<FundEntry>,
    /// Tickers with a fixed $1.00 NAV whose files list daily rates.
    #[serde(default = "default_money_market")]
    pub money_market: Vec<String>,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub dates: DateConfig,
}

fn default_money_market() -> Vec<String> {
    vec!["AFAXX".to_string()]
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "mfhist", "mfhist")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
funds:
  - ticker: "ANCFX"
  - ticker: "AGTHX"
    name: "Growth Fund"
  - ticker: "AFAXX"
money_market: ["AFAXX"]
sources:
  distributions:
    base_url: "http://localhost:8000/funds"
    mode: per_ticker
  quotes:
    base_url: "http://example.com/quotes"
dates:
  two_digit_year_pivot: 50
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.funds.len(), 3);
        assert_eq!(config.funds[0].ticker, "ANCFX");
        assert!(config.funds[0].name.is_none());
        assert_eq!(config.funds[1].name.as_deref(), Some("Growth Fund"));
        assert_eq!(config.money_market, vec!["AFAXX"]);

        let distributions = config.sources.distributions.as_ref().unwrap();
        assert_eq!(distributions.base_url, "http://localhost:8000/funds");
        assert_eq!(distributions.mode, IngestMode::PerTicker);
        assert_eq!(distributions.combined_file, "distributions.txt");

        assert_eq!(
            config.sources.quotes.unwrap().base_url,
            "http://example.com/quotes"
        );
        assert_eq!(config.dates.year_pivot(), YearPivot::Sliding(50));
    }

    #[test]
    fn test_config_defaults() {
        let yaml_str = r#"
funds:
  - ticker: "ANCFX"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.money_market, vec!["AFAXX"]);
        assert!(config.sources.distributions.is_none());
        assert!(config.sources.quotes.is_some());
        assert_eq!(config.dates.year_pivot(), YearPivot::Always2000);
    }

    #[test]
    fn test_combined_mode_deserialization() {
        let yaml_str = r#"
funds:
  - ticker: "AFAXX"
sources:
  distributions:
    base_url: "http://localhost:8000/funds"
    mode: combined
    combined_file: "all_funds.txt"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let distributions = config.sources.distributions.unwrap();
        assert_eq!(distributions.mode, IngestMode::Combined);
        assert_eq!(distributions.combined_file, "all_funds.txt");
    }
}
