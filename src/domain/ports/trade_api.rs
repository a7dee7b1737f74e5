use crate::domain::entities::position::{Position, PositionDetail};
use crate::domain::entities::trade::{NewTrade, Trade, TradeUpdate};
use crate::domain::error::DomainError;
use crate::domain::values::trade_status::TradeStatus;
use crate::domain::values::trading_type::TradingType;
use crate::domain::values::transaction_type::TransactionType;
use crate::domain::values::win_loss::WinLoss;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Server-side trade filters. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeFilter {
    pub trading_type: Option<TradingType>,
    pub win_loss: Option<WinLoss>,
    pub status: Option<TradeStatus>,
    pub transaction_type: Option<TransactionType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl TradeFilter {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(t) = self.trading_type {
            params.push(("trading_type", t.to_string()));
        }
        if let Some(w) = self.win_loss {
            params.push(("win_loss", w.to_string()));
        }
        if let Some(s) = self.status {
            params.push(("status", s.to_string()));
        }
        if let Some(t) = self.transaction_type {
            params.push(("transaction_type", t.to_string()));
        }
        if let Some(d) = self.date_from {
            params.push(("date_from", d.format("%Y-%m-%d").to_string()));
        }
        if let Some(d) = self.date_to {
            params.push(("date_to", d.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionFilter {
    pub status: Option<TradeStatus>,
    /// Case-insensitive substring match on the symbol.
    pub symbol: Option<String>,
}

impl PositionFilter {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(s) = self.status {
            params.push(("status", s.to_string()));
        }
        if let Some(sym) = self.symbol.as_ref().filter(|s| !s.is_empty()) {
            params.push(("symbol", sym.clone()));
        }
        params
    }
}

#[async_trait]
pub trait TradeApi: Send + Sync {
    async fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<Trade>, DomainError>;
    async fn get_trade(&self, id: &str) -> Result<Trade, DomainError>;
    async fn create_trade(&self, trade: &NewTrade) -> Result<Trade, DomainError>;
    async fn update_trade(&self, id: &str, update: &TradeUpdate) -> Result<Trade, DomainError>;
    async fn delete_trade(&self, id: &str) -> Result<(), DomainError>;

    async fn list_positions(&self, filter: &PositionFilter) -> Result<Vec<Position>, DomainError>;
    async fn get_position(&self, id: &str) -> Result<PositionDetail, DomainError>;
    /// Deletes the position and every trade attached to it.
    async fn delete_position(&self, id: &str) -> Result<String, DomainError>;
}
