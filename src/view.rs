//! Terminal renderings of distribution and NAV history data.

use crate::config::AppConfig;
use crate::core::dates::{self, DateNormalizer};
use crate::core::distribution::{DistributionStore, DistributionTable};
use crate::loader::DistributionLoader;
use crate::providers::nav_chart::{NavPoint, NavSeriesProvider};
use crate::ui;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use comfy_table::Cell;
use futures::future::join_all;

fn configured_tickers(config: &AppConfig) -> Vec<String> {
    config
        .funds
        .iter()
        .map(|fund| fund.ticker.trim().to_uppercase())
        .collect()
}

fn distribution_table(table: &DistributionTable) -> comfy_table::Table {
    let mut out = ui::new_styled_table();
    out.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Reinvest NAV"),
        ui::header_cell("Distribution"),
    ]);
    for (date, record) in table.sorted() {
        out.add_row(vec![
            Cell::new(date),
            ui::amount_cell(&format!("{:.2}", record.reinvest_nav)),
            ui::amount_cell(&record.total_distributions.to_string()),
        ]);
    }
    out
}

fn print_on_date(date_key: &str, store: &DistributionStore) {
    let on_date = store.on_date(date_key);
    println!(
        "Distributions on {}\n",
        ui::style_text(date_key, ui::StyleType::Title)
    );

    if on_date.is_empty() {
        println!(
            "{}",
            ui::style_text("No fund distributed on this date", ui::StyleType::Subtle)
        );
        return;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Reinvest NAV"),
        ui::header_cell("Distribution"),
    ]);
    let mut tickers: Vec<_> = on_date.keys().copied().collect();
    tickers.sort_unstable();
    for ticker in tickers {
        let record = on_date[ticker];
        table.add_row(vec![
            Cell::new(ticker),
            ui::amount_cell(&format!("{:.2}", record.reinvest_nav)),
            ui::amount_cell(&record.total_distributions.to_string()),
        ]);
    }
    println!("{table}");
}

/// Renders each configured fund's distribution history, or the
/// cross-fund view for a single date when one is given.
pub async fn show_distributions(
    config: &AppConfig,
    loader: &DistributionLoader<'_>,
    on_date: Option<&str>,
    dates: &DateNormalizer,
) -> Result<()> {
    let tickers = configured_tickers(config);

    let pb = ui::new_progress_bar(tickers.len() as u64, true);
    pb.set_message("Fetching distributions...");
    let store = loader.load_all(&tickers, pb.clone()).await;
    pb.finish_and_clear();

    if let Some(raw) = on_date {
        let key = dates
            .normalize(raw)
            .with_context(|| format!("Unrecognized date: {raw}"))?;
        print_on_date(&key, &store);
        return Ok(());
    }

    let count = tickers.len();
    for (i, ticker) in tickers.iter().enumerate() {
        println!("Fund: {}\n", ui::style_text(ticker, ui::StyleType::Title));
        match store.table(ticker) {
            Some(table) if !table.is_empty() => {
                println!("{}", distribution_table(table));
                println!(
                    "\n{}: {}",
                    ui::style_text("Total Distributions", ui::StyleType::TotalLabel),
                    ui::style_text(&table.total().to_string(), ui::StyleType::TotalValue)
                );
            }
            _ => println!(
                "{}",
                ui::style_text("No distribution data", ui::StyleType::Error)
            ),
        }
        if i < count - 1 {
            ui::print_separator();
        }
    }

    Ok(())
}

struct FundHistory {
    ticker: String,
    table: DistributionTable,
    nav: Result<Vec<NavPoint>, String>,
}

fn history_table(points: &[NavPoint], table: &DistributionTable) -> comfy_table::Table {
    let mut out = ui::new_styled_table();
    out.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("NAV"),
        ui::header_cell("Distribution"),
    ]);
    for point in points {
        let key = dates::canonical_key(point.date);
        let distribution = match table.get(&key) {
            Some(record) => ui::amount_cell(&record.total_distributions.to_string()),
            None => ui::na_cell(),
        };
        out.add_row(vec![
            Cell::new(&key),
            ui::amount_cell(&format!("{:.2}", point.nav)),
            distribution,
        ]);
    }
    out
}

/// Renders each fund's NAV series joined with its distributions by
/// canonical date. Distribution and NAV fetches fan out concurrently;
/// one fund's failure only degrades that fund's section.
pub async fn show_history(
    config: &AppConfig,
    loader: &DistributionLoader<'_>,
    provider: &dyn NavSeriesProvider,
    years: u32,
) -> Result<()> {
    let end = Utc::now().date_naive();
    let start = end - Duration::days(365 * i64::from(years));

    let pb = ui::new_progress_bar(config.funds.len() as u64, true);
    pb.set_message("Fetching NAV history...");

    let futures = configured_tickers(config).into_iter().map(|ticker| {
        let pb = pb.clone();
        async move {
            let (table, nav) = futures::join!(
                loader.load(&ticker),
                provider.fetch_nav_series(&ticker, start, end)
            );
            pb.inc(1);
            FundHistory {
                ticker,
                table,
                nav: nav.map_err(|e| e.to_string()),
            }
        }
    });
    let histories = join_all(futures).await;
    pb.finish_and_clear();

    let count = histories.len();
    for (i, history) in histories.iter().enumerate() {
        println!(
            "Fund: {}\n",
            ui::style_text(&history.ticker, ui::StyleType::Title)
        );
        match &history.nav {
            Ok(points) if !points.is_empty() => {
                println!("{}", history_table(points, &history.table));
            }
            Ok(_) => println!(
                "{}",
                ui::style_text("No NAV history in range", ui::StyleType::Subtle)
            ),
            Err(e) => {
                println!(
                    "{}",
                    ui::style_text(&format!("NAV history unavailable: {e}"), ui::StyleType::Error)
                );
                // Distributions can still render on their own.
                if !history.table.is_empty() {
                    println!("\n{}", distribution_table(&history.table));
                }
            }
        }
        if i < count - 1 {
            ui::print_separator();
        }
    }

    Ok(())
}
