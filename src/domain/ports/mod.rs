pub mod auth_api;
pub mod dashboard_api;
pub mod insights_api;
pub mod journal_api;
pub mod session_store;
pub mod trade_api;
