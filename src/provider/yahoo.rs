use crate::model::ProviderError;
use crate::provider::payload::{ChartPayload, HoldersPayload, InsightsPayload};
use crate::provider::traits::DataProvider;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

const BASE_URL: &str = "https://query1.finance.yahoo.com";

/// HTTP implementation of the data provider.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) StockScope/0.1")
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl DataProvider for YahooProvider {
    async fn chart(
        &self,
        ticker: &str,
        interval: &str,
        range: &str,
    ) -> Result<ChartPayload, ProviderError> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval={}&range={}",
            self.base_url, ticker, interval, range
        );
        self.fetch_json(&url).await
    }

    async fn insights(&self, ticker: &str) -> Result<InsightsPayload, ProviderError> {
        let url = format!(
            "{}/ws/insights/v2/finance/insights?symbol={}",
            self.base_url, ticker
        );
        self.fetch_json(&url).await
    }

    async fn holders(&self, ticker: &str) -> Result<HoldersPayload, ProviderError> {
        let url = format!("{}/v1/finance/holders?symbol={}", self.base_url, ticker);
        self.fetch_json(&url).await
    }
}
