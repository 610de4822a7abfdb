use super::util::with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

/// Reads one named raw-text resource, typically a hand-maintained
/// distribution file.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn fetch_text(&self, identifier: &str) -> Result<String>;
}

/// Fetches distribution files over HTTP from a configured base URL.
pub struct HttpTextSource {
    base_url: String,
}

impl HttpTextSource {
    pub fn new(base_url: &str) -> Self {
        HttpTextSource {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TextSource for HttpTextSource {
    async fn fetch_text(&self, identifier: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, identifier);
        debug!("Requesting distribution file from {}", url);

        let client = reqwest::Client::builder().user_agent("mfhist/1.0").build()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 3, 500)
            .await
            .with_context(|| format!("Failed to request distribution file: {identifier}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for distribution file: {}",
                response.status(),
                identifier
            ));
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read distribution file: {identifier}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(identifier: &str, body: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/{identifier}")))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_text_fetch() {
        let body = "AFAXX\n0.0001\t01/02/24\n";
        let mock_server = create_mock_server("mmf_AFAXX.txt", body, 200).await;

        let source = HttpTextSource::new(&mock_server.uri());
        let text = source.fetch_text("mmf_AFAXX.txt").await.unwrap();
        assert_eq!(text, body);
    }

    #[tokio::test]
    async fn test_not_found_is_an_error() {
        let mock_server = create_mock_server("mmf_AFAXX.txt", "missing", 404).await;

        let source = HttpTextSource::new(&mock_server.uri());
        let result = source.fetch_text("mmf_AFAXX.txt").await;

        assert!(result.is_err());
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("HTTP error: 404"));
        assert!(error_msg.contains("mmf_AFAXX.txt"));
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let body = "0.0001\t01/02/24\n";
        let mock_server = create_mock_server("mmf_AFAXX.txt", body, 200).await;

        let source = HttpTextSource::new(&format!("{}/", mock_server.uri()));
        let text = source.fetch_text("mmf_AFAXX.txt").await.unwrap();
        assert_eq!(text, body);
    }
}
