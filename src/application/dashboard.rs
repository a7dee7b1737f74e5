use crate::application::sequencer::{RequestCategory, RequestSequencer};
use crate::domain::entities::dashboard::{
    DashboardCharts, DashboardStats, StatementUpload, TradingTypeBreakdown, UploadSummary,
};
use crate::domain::error::DomainError;
use crate::domain::ports::dashboard_api::DashboardApi;
use crate::domain::values::platform::Platform;
use crate::domain::values::trading_type::TradingType;
use log::info;
use std::path::Path;
use std::sync::Arc;

pub struct DashboardUseCase {
    api: Arc<dyn DashboardApi>,
    sequencer: Arc<RequestSequencer>,
}

impl DashboardUseCase {
    pub fn new(api: Arc<dyn DashboardApi>, sequencer: Arc<RequestSequencer>) -> Self {
        Self { api, sequencer }
    }

    pub async fn stats(&self, trading_type: Option<TradingType>) -> Result<DashboardStats, DomainError> {
        self.api.stats(trading_type).await
    }

    pub async fn chart(&self, trading_type: Option<TradingType>) -> Result<DashboardCharts, DomainError> {
        self.api.chart(trading_type).await
    }

    pub async fn type_stats(&self) -> Result<TradingTypeBreakdown, DomainError> {
        self.api.trading_type_stats().await
    }

    /// Stats and charts for one trading-type tab. `None` when the user has
    /// already switched tabs again.
    pub async fn load(
        &self,
        trading_type: Option<TradingType>,
    ) -> Option<Result<(DashboardStats, DashboardCharts), DomainError>> {
        self.sequencer
            .run(RequestCategory::Dashboard, async {
                let (stats, chart) = tokio::join!(self.stats(trading_type), self.chart(trading_type));
                Ok::<_, DomainError>((stats?, chart?))
            })
            .await
    }

    pub async fn upload(&self, platform: &str, path: &Path) -> Result<UploadSummary, DomainError> {
        let platform: Platform = platform.parse().map_err(DomainError::InvalidInput)?;
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::InvalidInput(format!("Cannot read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("statement.csv")
            .to_string();
        self.upload_bytes(platform, file_name, contents).await
    }

    pub async fn upload_bytes(
        &self,
        platform: Platform,
        file_name: String,
        contents: Vec<u8>,
    ) -> Result<UploadSummary, DomainError> {
        if contents.is_empty() {
            return Err(DomainError::InvalidInput("Please select a file to upload".into()));
        }
        let upload = StatementUpload {
            platform,
            file_name,
            contents,
        };
        let summary = self.api.upload_statement(&upload).await?;
        info!(
            "imported {} trades from {} ({} new positions)",
            summary.num_trades, upload.file_name, summary.new_positions
        );
        Ok(summary)
    }
}
