pub mod dashboard;
pub mod insights;
pub mod journal_entry;
pub mod position;
pub mod session;
pub mod trade;
pub mod user;
