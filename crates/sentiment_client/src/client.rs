use std::time::Duration;

use async_trait::async_trait;
use common::config::SentimentConfig;
use common::{Error, SentimentSource, TickerMention, TrendingResponse};
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

pub struct SentimentClient {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl SentimentClient {
    pub fn new(config: &SentimentConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    /// Top `limit` tickers by mention volume, most-discussed first.
    #[instrument(skip(self))]
    pub async fn get_trending_tickers(&self, limit: usize) -> Result<Vec<TickerMention>, Error> {
        let url = format!("{}/trending", self.base_url);
        let limit_param = limit.to_string();

        let mut attempt = 0u32;
        loop {
            let send_result = self
                .client
                .get(&url)
                .query(&[("limit", limit_param.as_str())])
                .send()
                .await;

            match send_result {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        if status.as_u16() == 429 && attempt < self.max_retries {
                            attempt += 1;
                            sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                            continue;
                        }
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::SourceUnavailable(format!(
                            "HTTP status {}: {}",
                            status.as_u16(),
                            body
                        )));
                    }

                    let body: TrendingResponse = response
                        .json()
                        .await
                        .map_err(|e| Error::SourceUnavailable(format!("invalid payload: {}", e)))?;

                    let mut tickers = body.tickers;
                    if tickers.len() > limit {
                        debug!("Source returned {} tickers, keeping {}", tickers.len(), limit);
                        tickers.truncate(limit);
                    }
                    return Ok(tickers);
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        attempt += 1;
                        warn!("Trending request failed (attempt {}): {}", attempt, e);
                        sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                        continue;
                    }
                    if e.is_timeout() {
                        return Err(Error::SourceUnavailable("request timed out".into()));
                    }
                    return Err(Error::SourceUnavailable(e.to_string()));
                }
            }
        }
    }
}

#[async_trait]
impl SentimentSource for SentimentClient {
    async fn get_trending_tickers(&self, limit: usize) -> common::Result<Vec<TickerMention>> {
        SentimentClient::get_trending_tickers(self, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(base_url: &str) -> SentimentClient {
        SentimentClient::new(&SentimentConfig {
            base_url: base_url.into(),
            timeout_secs: 5,
            max_retries: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_trending_parses_and_truncates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tickers": [
                    { "symbol": "GME", "sentiment": 0.5, "mentions": 10 },
                    { "symbol": "TSLA", "sentiment": -0.1, "mentions": 7 },
                    { "symbol": "AMD", "sentiment": 0.2, "mentions": 3 }
                ],
                "count": 3
            })))
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let tickers = client.get_trending_tickers(2).await.unwrap();

        assert_eq!(tickers.len(), 2);
        assert_eq!(tickers[0].symbol, "GME");
        assert_eq!(tickers[0].mentions, 10);
        assert_eq!(tickers[1].sentiment, -0.1);
    }

    #[tokio::test]
    async fn test_empty_list_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "tickers": [], "count": 0 })),
            )
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        assert!(client.get_trending_tickers(20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(ResponseTemplate::new(503).set_body_string("scraper down"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        match client.get_trending_tickers(20).await {
            Err(Error::SourceUnavailable(msg)) => assert!(msg.contains("503")),
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_then_ok_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tickers": [ { "symbol": "SPY", "sentiment": 0.1, "mentions": 4 } ],
                "count": 1
            })))
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let tickers = client.get_trending_tickers(5).await.unwrap();
        assert_eq!(tickers[0].symbol, "SPY");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let err = client.get_trending_tickers(5).await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));
    }
}
