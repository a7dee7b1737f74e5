use crate::domain::entities::dashboard::{
    DashboardCharts, DashboardStats, StatementUpload, TradingTypeBreakdown, UploadSummary,
};
use crate::domain::error::DomainError;
use crate::domain::values::trading_type::TradingType;
use async_trait::async_trait;

#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn stats(&self, trading_type: Option<TradingType>) -> Result<DashboardStats, DomainError>;
    async fn chart(&self, trading_type: Option<TradingType>) -> Result<DashboardCharts, DomainError>;
    async fn trading_type_stats(&self) -> Result<TradingTypeBreakdown, DomainError>;
    async fn upload_statement(&self, upload: &StatementUpload) -> Result<UploadSummary, DomainError>;
}
