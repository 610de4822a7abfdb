use super::util::with_retry;
use crate::cache::Cache;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// One NAV sample from the external quote service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavPoint {
    pub date: NaiveDate,
    pub nav: f64,
}

/// Retrieves a fund's historical NAV series. The distribution core only
/// consumes this interface; the wire format belongs to the provider.
#[async_trait]
pub trait NavSeriesProvider: Send + Sync {
    async fn fetch_nav_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NavPoint>>;
}

// Chart-endpoint provider (Yahoo-style daily close series)
pub struct ChartNavProvider {
    base_url: String,
    cache: Arc<Cache<String, Vec<NavPoint>>>,
}

impl ChartNavProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, Vec<NavPoint>>>) -> Self {
        ChartNavProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Vec<ChartItem>,
}

#[derive(Debug, Deserialize)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl NavSeriesProvider for ChartNavProvider {
    async fn fetch_nav_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NavPoint>> {
        let cache_key = format!("{symbol}:{start}:{end}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            return Ok(cached);
        }

        // period2 is exclusive upstream, so push it one day past `end`.
        let period1 = day_start_timestamp(start);
        let period2 = day_start_timestamp(end.checked_add_days(Days::new(1)).unwrap_or(end));
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url, symbol, period1, period2
        );
        debug!("Requesting NAV series from {}", url);

        let client = reqwest::Client::builder().user_agent("mfhist/1.0").build()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 3, 500)
            .await
            .with_context(|| format!("Failed to request NAV series for symbol: {symbol}"))?;

        let data = response
            .json::<ChartResponse>()
            .await
            .with_context(|| format!("Failed to parse NAV series response for symbol: {symbol}"))?;
        let item = data
            .chart
            .result
            .first()
            .ok_or_else(|| anyhow!("No NAV data found for symbol: {}", symbol))?;

        let (Some(timestamps), Some(closes)) = (
            item.timestamp.as_ref(),
            item.indicators
                .as_ref()
                .and_then(|inds| inds.quote.first())
                .and_then(|q| q.close.as_ref()),
        ) else {
            return Err(anyhow!("No NAV series returned for symbol: {}", symbol));
        };

        let mut points: Vec<NavPoint> = timestamps
            .iter()
            .zip(closes.iter())
            .filter_map(|(ts, close)| {
                let nav = (*close)?;
                if nav <= 0.0 {
                    return None;
                }
                Utc.timestamp_opt(*ts, 0).single().map(|dt| NavPoint {
                    date: dt.date_naive(),
                    nav,
                })
            })
            .collect();

        // Sort by date and keep one sample per day (last wins)
        points.sort_by_key(|point| point.date);
        points.dedup_by_key(|point| point.date);

        self.cache.put(cache_key, points.clone()).await;

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(symbol: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{symbol}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_successful_nav_series_fetch() {
        // 01/02/2024 and 01/03/2024 midnight UTC
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000],
                    "indicators": {
                        "quote": [{
                            "close": [12.34, 12.56]
                        }]
                    }
                }]
            }
        }"#;

        let mock_server = create_mock_server("ANCFX", mock_response).await;
        let cache = Arc::new(Cache::new());
        let provider = ChartNavProvider::new(&mock_server.uri(), cache);

        let (start, end) = range();
        let points = provider.fetch_nav_series("ANCFX", start, end).await.unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(points[0].nav, 12.34);
        assert_eq!(points[1].nav, 12.56);
    }

    #[tokio::test]
    async fn test_null_and_nonpositive_closes_are_dropped() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": {
                        "quote": [{
                            "close": [null, 0.0, 12.56]
                        }]
                    }
                }]
            }
        }"#;

        let mock_server = create_mock_server("ANCFX", mock_response).await;
        let cache = Arc::new(Cache::new());
        let provider = ChartNavProvider::new(&mock_server.uri(), cache);

        let (start, end) = range();
        let points = provider.fetch_nav_series("ANCFX", start, end).await.unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].nav, 12.56);
    }

    #[tokio::test]
    async fn test_no_result_data() {
        let mock_response = r#"{"chart": {"result": []}}"#;
        let mock_server = create_mock_server("INVALID", mock_response).await;
        let cache = Arc::new(Cache::new());
        let provider = ChartNavProvider::new(&mock_server.uri(), cache);

        let (start, end) = range();
        let result = provider.fetch_nav_series("INVALID", start, end).await;

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No NAV data found for symbol: INVALID"
        );
    }

    #[tokio::test]
    async fn test_series_is_cached_per_run() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600],
                    "indicators": {
                        "quote": [{
                            "close": [12.34]
                        }]
                    }
                }]
            }
        }"#;

        let mock_server = create_mock_server("ANCFX", mock_response).await;
        let cache = Arc::new(Cache::new());
        let provider = ChartNavProvider::new(&mock_server.uri(), Arc::clone(&cache));

        let (start, end) = range();
        provider.fetch_nav_series("ANCFX", start, end).await.unwrap();

        let cached = cache.get(&format!("ANCFX:{start}:{end}")).await;
        assert_eq!(cached.unwrap().len(), 1);
    }
}
