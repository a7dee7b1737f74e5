use crate::domain::entities::insights::InsightsFetch;
use async_trait::async_trait;

/// Insights endpoints answer with a tagged outcome instead of a `Result`:
/// a missing-insights 404 still carries plan metadata the caller needs.
#[async_trait]
pub trait InsightsApi: Send + Sync {
    /// Previously generated insights, if any.
    async fn stored_insights(&self) -> InsightsFetch;
    /// Ask the backend to generate a fresh set. Subject to the plan cooldown.
    async fn generate_insights(&self) -> InsightsFetch;
}
