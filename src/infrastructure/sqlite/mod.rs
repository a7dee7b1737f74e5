pub mod migrations;
pub mod session_store;
