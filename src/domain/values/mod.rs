pub mod entry_type;
pub mod plan_tier;
pub mod platform;
pub mod trade_status;
pub mod trading_type;
pub mod transaction_type;
pub mod win_loss;
