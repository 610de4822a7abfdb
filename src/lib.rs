pub mod cache;
pub mod config;
pub mod core;
pub mod loader;
pub mod log;
pub mod parse;
pub mod providers;
pub mod ui;
pub mod view;

use crate::cache::Cache;
use crate::core::{DateNormalizer, FundClassifier};
use crate::loader::DistributionLoader;
use crate::providers::nav_chart::ChartNavProvider;
use crate::providers::text_source::HttpTextSource;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Distributions { date: Option<String> },
    History { years: u32 },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Fund history viewer starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let classifier = FundClassifier::new(&config.money_market);
    let dates = DateNormalizer::new(config.dates.year_pivot());

    let dist_config = config.sources.distributions.as_ref().context(
        "No distribution source configured. Run 'mfhist setup' and set sources.distributions",
    )?;
    let source = HttpTextSource::new(&dist_config.base_url);
    let loader = DistributionLoader::new(
        &source,
        &classifier,
        &dates,
        dist_config.mode,
        &dist_config.combined_file,
    );

    match command {
        AppCommand::Distributions { date } => {
            view::show_distributions(&config, &loader, date.as_deref(), &dates).await
        }
        AppCommand::History { years } => {
            let quotes_base = config
                .sources
                .quotes
                .as_ref()
                .map_or("https://query1.finance.yahoo.com", |q| q.base_url.as_str());
            let nav_cache = Arc::new(Cache::new());
            let provider = ChartNavProvider::new(quotes_base, nav_cache);
            view::show_history(&config, &loader, &provider, years).await
        }
    }
}
