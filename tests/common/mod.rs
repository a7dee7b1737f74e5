//! Shared test helpers.
#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;
use tradejournal::application::trade::TradeForm;
use tradejournal::domain::entities::trade::Trade;
use tradejournal::domain::values::trade_status::TradeStatus;
use tradejournal::domain::values::trading_type::TradingType;
use tradejournal::domain::values::transaction_type::TransactionType;
use tradejournal::infrastructure::memory::backend::InMemoryJournalApi;
use tradejournal::TradeJournal;

pub const EMAIL: &str = "trader@example.com";
pub const PASSWORD: &str = "Str0ngPass";

pub fn setup() -> (TradeJournal, Arc<InMemoryJournalApi>) {
    TradeJournal::in_memory().unwrap()
}

/// A fresh journal with one account, already logged in.
pub async fn logged_in() -> (TradeJournal, Arc<InMemoryJournalApi>) {
    let (tj, backend) = setup();
    tj.signup(EMAIL, PASSWORD, PASSWORD).await.unwrap();
    tj.login(EMAIL, PASSWORD).await.unwrap();
    (tj, backend)
}

pub fn trade_form(date: &str, symbol: &str, shares: i64, buy: f64, sell: Option<f64>, kind: &str) -> TradeForm {
    TradeForm {
        date: Some(date.to_string()),
        ticker_symbol: Some(symbol.to_string()),
        number_of_shares: Some(shares),
        buy_price: Some(buy),
        sell_price: sell,
        trading_type: Some(kind.to_string()),
        transaction_type: None,
    }
}

/// A bare trade leg for feeding the aggregator directly.
pub fn leg(symbol: &str, date: &str, shares: i64, buy: Option<f64>, sell: Option<f64>) -> Trade {
    Trade {
        id: format!("{symbol}-{date}-{shares}-{}", sell.is_some()),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        ticker_symbol: symbol.to_string(),
        number_of_shares: shares,
        buy_price: buy,
        sell_price: sell,
        trading_type: TradingType::Swing,
        status: if sell.is_some() { TradeStatus::Closed } else { TradeStatus::Open },
        transaction_type: TransactionType::Stock,
        shares_remaining: None,
        price_cost_basis: None,
        proceeds: None,
        win_loss: None,
        position_id: None,
        pnl: None,
        created_at: None,
        updated_at: None,
    }
}
