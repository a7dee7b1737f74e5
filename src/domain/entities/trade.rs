use crate::domain::values::trade_status::TradeStatus;
use crate::domain::values::trading_type::TradingType;
use crate::domain::values::transaction_type::TransactionType;
use crate::domain::values::win_loss::WinLoss;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One leg of a position as the backend records it.
///
/// A leg with a buy price and no sell price opens shares; a leg with a sell
/// price closes them. Legs entered by hand may carry both prices, in which
/// case they are a complete round trip on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub date: NaiveDate,
    pub ticker_symbol: String,
    pub number_of_shares: i64,
    #[serde(default)]
    pub buy_price: Option<f64>,
    #[serde(default)]
    pub sell_price: Option<f64>,
    pub trading_type: TradingType,
    pub status: TradeStatus,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub shares_remaining: Option<i64>,
    #[serde(default)]
    pub price_cost_basis: Option<f64>,
    #[serde(default)]
    pub proceeds: Option<f64>,
    #[serde(default)]
    pub win_loss: Option<WinLoss>,
    #[serde(default)]
    pub position_id: Option<String>,
    /// Realized P&L as computed by the backend. Authoritative when present.
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Trade {
    pub fn is_open_leg(&self) -> bool {
        self.buy_price.is_some() && self.sell_price.is_none()
    }

    pub fn is_closing_leg(&self) -> bool {
        self.sell_price.is_some()
    }

    /// Realized P&L of this leg on its own: the backend's `pnl` if it sent
    /// one, else its `proceeds - price_cost_basis`, else computed from the
    /// two prices.
    pub fn realized_pnl(&self) -> Option<f64> {
        if self.pnl.is_some() {
            return self.pnl;
        }
        if let (Some(proceeds), Some(cost)) = (self.proceeds, self.price_cost_basis) {
            return Some(proceeds - cost);
        }
        match (self.buy_price, self.sell_price) {
            (Some(buy), Some(sell)) => Some((sell - buy) * self.number_of_shares as f64),
            _ => None,
        }
    }
}

/// Payload for creating a trade. An absent sell price records an open leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTrade {
    pub date: NaiveDate,
    pub ticker_symbol: String,
    pub number_of_shares: i64,
    pub buy_price: f64,
    pub sell_price: Option<f64>,
    pub trading_type: TradingType,
    pub transaction_type: TransactionType,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_shares: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_type: Option<TradingType>,
}

impl TradeUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TradeUpdate::default()
    }
}
