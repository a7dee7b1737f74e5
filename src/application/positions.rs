//! Reduces flat buy/sell trade legs into per-symbol positions.
//!
//! Sell legs are matched against open buy legs first-in first-out by trade
//! date. A leg that already carries a backend P&L figure (`pnl`, or
//! `proceeds` and `price_cost_basis`) is trusted as-is; only legs without
//! one are priced from the matched lots.

use crate::domain::entities::position::{Position, PositionDetail};
use crate::domain::entities::trade::Trade;
use crate::domain::error::DomainError;
use crate::domain::ports::trade_api::{PositionFilter, TradeApi, TradeFilter};
use crate::domain::values::trade_status::TradeStatus;
use chrono::NaiveDate;
use log::debug;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// Shares still held from one buy, at the price they were bought.
#[derive(Debug, Clone, Copy)]
struct Lot {
    shares: i64,
    price: f64,
}

/// Take up to `shares` from the front of the queue. Returns how many shares
/// were matched and what they cost.
fn consume_fifo(lots: &mut VecDeque<Lot>, mut shares: i64) -> (i64, f64) {
    let mut matched = 0;
    let mut cost = 0.0;
    while shares > 0 {
        let Some(front) = lots.front_mut() else { break };
        let take = front.shares.min(shares);
        matched += take;
        cost += take as f64 * front.price;
        front.shares -= take;
        shares -= take;
        if front.shares == 0 {
            lots.pop_front();
        }
    }
    (matched, cost)
}

fn earliest(current: Option<NaiveDate>, date: NaiveDate) -> Option<NaiveDate> {
    Some(current.map_or(date, |d| d.min(date)))
}

fn latest(current: Option<NaiveDate>, date: NaiveDate) -> Option<NaiveDate> {
    Some(current.map_or(date, |d| d.max(date)))
}

/// Build the position for `symbol` out of whichever of `trades` belong to it.
pub fn aggregate(symbol: &str, trades: &[Trade]) -> Position {
    let mut legs: Vec<&Trade> = trades
        .iter()
        .filter(|t| t.ticker_symbol.eq_ignore_ascii_case(symbol))
        .collect();
    // Same-day buys go ahead of same-day sells so a day trade matches itself.
    legs.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.is_closing_leg().cmp(&b.is_closing_leg()))
    });

    let mut lots: VecDeque<Lot> = VecDeque::new();
    let mut bought: i64 = 0;
    let mut buy_cost = 0.0;
    let mut sold: i64 = 0;
    let mut sell_value = 0.0;
    let mut pnl: Option<f64> = None;
    let mut buy_date = None;
    let mut sell_date = None;

    for leg in &legs {
        let shares = leg.number_of_shares;
        match (leg.buy_price, leg.sell_price) {
            (Some(buy), None) => {
                bought += shares;
                buy_cost += buy * shares as f64;
                buy_date = earliest(buy_date, leg.date);
                lots.push_back(Lot { shares, price: buy });
            }
            (Some(buy), Some(sell)) => {
                bought += shares;
                buy_cost += buy * shares as f64;
                sold += shares;
                sell_value += sell * shares as f64;
                buy_date = earliest(buy_date, leg.date);
                sell_date = latest(sell_date, leg.date);
                let leg_pnl = leg.realized_pnl().unwrap_or((sell - buy) * shares as f64);
                pnl = Some(pnl.unwrap_or(0.0) + leg_pnl);
            }
            (None, Some(sell)) => {
                sold += shares;
                sell_value += sell * shares as f64;
                sell_date = latest(sell_date, leg.date);
                let (matched, cost) = consume_fifo(&mut lots, shares);
                if matched < shares {
                    debug!(
                        "{symbol}: {} of {shares} shares sold on {} have no recorded buy",
                        shares - matched,
                        leg.date
                    );
                }
                let leg_pnl = match leg.realized_pnl() {
                    Some(reported) => reported,
                    None => sell * matched as f64 - cost,
                };
                pnl = Some(pnl.unwrap_or(0.0) + leg_pnl);
            }
            (None, None) => {
                debug!("{symbol}: skipping trade {} with no prices", leg.id);
            }
        }
    }

    let status = position_status(&legs, sold, &lots);

    Position {
        id: None,
        symbol: symbol.to_uppercase(),
        status,
        total_shares: bought.max(sold) as f64,
        buy_price: (bought > 0).then(|| buy_cost / bought as f64),
        sell_price: (sold > 0).then(|| sell_value / sold as f64),
        buy_date,
        sell_date,
        pnl,
    }
}

/// A position is open while any shares are unmatched. The backend's
/// `shares_remaining` wins when it reports one; otherwise the leftover FIFO
/// lots decide.
fn position_status(legs: &[&Trade], sold: i64, lots: &VecDeque<Lot>) -> TradeStatus {
    if sold == 0 && !legs.is_empty() {
        return TradeStatus::Open;
    }
    let reported: Vec<i64> = legs.iter().filter_map(|l| l.shares_remaining).collect();
    if reported.iter().any(|&r| r > 0) {
        return TradeStatus::Open;
    }
    if !legs.is_empty() && reported.len() == legs.len() {
        return TradeStatus::Closed;
    }
    if lots.iter().any(|l| l.shares > 0) {
        TradeStatus::Open
    } else {
        TradeStatus::Closed
    }
}

/// One position per symbol, open positions first and then by symbol, the
/// order the positions endpoint uses.
pub fn aggregate_all(trades: &[Trade]) -> Vec<Position> {
    let mut by_symbol: BTreeMap<String, Vec<Trade>> = BTreeMap::new();
    for trade in trades {
        by_symbol
            .entry(trade.ticker_symbol.to_uppercase())
            .or_default()
            .push(trade.clone());
    }
    let mut positions: Vec<Position> = by_symbol
        .iter()
        .map(|(symbol, legs)| aggregate(symbol, legs))
        .collect();
    positions.sort_by_key(|p| !p.is_open());
    positions
}

pub struct PositionsUseCase {
    api: Arc<dyn TradeApi>,
}

impl PositionsUseCase {
    pub fn new(api: Arc<dyn TradeApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self, filter: &PositionFilter) -> Result<Vec<Position>, DomainError> {
        self.api.list_positions(filter).await
    }

    pub async fn detail(&self, id: &str) -> Result<PositionDetail, DomainError> {
        self.api.get_position(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<String, DomainError> {
        self.api.delete_position(id).await
    }

    /// Fetch trades and aggregate them locally instead of trusting the
    /// positions endpoint.
    pub async fn derive(&self, filter: &TradeFilter) -> Result<Vec<Position>, DomainError> {
        let trades = self.api.list_trades(filter).await?;
        debug!("deriving positions from {} trades", trades.len());
        Ok(aggregate_all(&trades))
    }

    pub async fn derive_symbol(&self, symbol: &str) -> Result<Position, DomainError> {
        let trades = self.api.list_trades(&TradeFilter::default()).await?;
        if !trades.iter().any(|t| t.ticker_symbol.eq_ignore_ascii_case(symbol)) {
            return Err(DomainError::NotFound(format!("No trades for symbol {symbol}")));
        }
        Ok(aggregate(symbol, &trades))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::trading_type::TradingType;
    use crate::domain::values::transaction_type::TransactionType;

    fn leg(symbol: &str, date: &str, shares: i64, buy: Option<f64>, sell: Option<f64>) -> Trade {
        Trade {
            id: format!("{symbol}-{date}-{shares}"),
            date: date.parse().unwrap(),
            ticker_symbol: symbol.into(),
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

    #[test]
    fn fifo_consumes_oldest_lot_first() {
        let mut lots = VecDeque::from(vec![
            Lot { shares: 5, price: 10.0 },
            Lot { shares: 5, price: 20.0 },
        ]);
        let (matched, cost) = consume_fifo(&mut lots, 7);
        assert_eq!(matched, 7);
        assert_eq!(cost, 5.0 * 10.0 + 2.0 * 20.0);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].shares, 3);
    }

    #[test]
    fn fifo_stops_when_lots_run_out() {
        let mut lots = VecDeque::from(vec![Lot { shares: 2, price: 10.0 }]);
        let (matched, cost) = consume_fifo(&mut lots, 5);
        assert_eq!(matched, 2);
        assert_eq!(cost, 20.0);
        assert!(lots.is_empty());
    }

    #[test]
    fn same_day_buy_sorts_before_sell() {
        let trades = vec![
            leg("QQQ", "2026-03-02", 4, None, Some(12.0)),
            leg("QQQ", "2026-03-02", 4, Some(10.0), None),
        ];
        let pos = aggregate("QQQ", &trades);
        assert_eq!(pos.pnl, Some(8.0));
        assert_eq!(pos.status, TradeStatus::Closed);
    }

    #[test]
    fn symbol_match_ignores_case() {
        let trades = vec![leg("abc", "2026-01-05", 3, Some(5.0), None)];
        let pos = aggregate("ABC", &trades);
        assert_eq!(pos.symbol, "ABC");
        assert_eq!(pos.total_shares, 3.0);
    }
}
