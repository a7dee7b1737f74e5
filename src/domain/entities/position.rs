use crate::domain::entities::trade::Trade;
use crate::domain::values::trade_status::TradeStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// All trades in one ticker symbol, reduced to a single holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Backend id (`POS_XXXXXXXX`). `None` for positions derived locally.
    #[serde(default)]
    pub id: Option<String>,
    pub symbol: String,
    pub status: TradeStatus,
    pub total_shares: f64,
    #[serde(default)]
    pub buy_price: Option<f64>,
    #[serde(default)]
    pub sell_price: Option<f64>,
    #[serde(default)]
    pub buy_date: Option<NaiveDate>,
    #[serde(default)]
    pub sell_date: Option<NaiveDate>,
    /// Realized P&L only. Open positions never include gains on unsold shares.
    #[serde(default)]
    pub pnl: Option<f64>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionDetail {
    pub position: Position,
    #[serde(default)]
    pub trades: Vec<Trade>,
}
