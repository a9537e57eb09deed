use crate::model::ProviderError;
use crate::provider::payload::{ChartPayload, HoldersPayload, InsightsPayload};

/// A financial data provider exposes three read-only operations per ticker.
/// Any of them may return a partial payload; only the chart fetch is
/// mandatory for a run.
#[async_trait::async_trait]
pub trait DataProvider: Send + Sync {
    async fn chart(
        &self,
        ticker: &str,
        interval: &str,
        range: &str,
    ) -> Result<ChartPayload, ProviderError>;

    async fn insights(&self, ticker: &str) -> Result<InsightsPayload, ProviderError>;

    async fn holders(&self, ticker: &str) -> Result<HoldersPayload, ProviderError>;
}
