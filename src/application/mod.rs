pub mod auth;
pub mod dashboard;
pub mod insights;
pub mod journal;
pub mod list_view;
pub mod positions;
pub mod sequencer;
pub mod trade;
