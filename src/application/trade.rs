use crate::application::list_view::{filter_and_paginate, ListQuery, Page};
use crate::application::sequencer::{RequestCategory, RequestSequencer};
use crate::domain::entities::trade::{NewTrade, Trade, TradeUpdate};
use crate::domain::error::{DomainError, FieldError};
use crate::domain::ports::trade_api::{TradeApi, TradeFilter};
use crate::domain::values::trading_type::TradingType;
use crate::domain::values::transaction_type::TransactionType;
use chrono::NaiveDate;
use log::info;
use serde::Deserialize;
use std::sync::Arc;

/// Raw trade form input, as typed or pasted as JSON. Nothing is trusted
/// until `validate` turns it into a `NewTrade`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeForm {
    pub date: Option<String>,
    pub ticker_symbol: Option<String>,
    pub number_of_shares: Option<i64>,
    pub buy_price: Option<f64>,
    pub sell_price: Option<f64>,
    pub trading_type: Option<String>,
    pub transaction_type: Option<String>,
}

fn parse_form_date(raw: &str, errors: &mut Vec<FieldError>) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push(FieldError::new("date", "Date must be YYYY-MM-DD"));
            None
        }
    }
}

impl TradeForm {
    pub fn validate(&self) -> Result<NewTrade, DomainError> {
        let mut errors = Vec::new();

        let date = match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => parse_form_date(raw, &mut errors),
            None => {
                errors.push(FieldError::new("date", "Date is required"));
                None
            }
        };

        let ticker = self
            .ticker_symbol
            .as_deref()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty());
        match &ticker {
            None => errors.push(FieldError::new("ticker_symbol", "Ticker symbol is required")),
            Some(t) if t.len() > 10 => {
                errors.push(FieldError::new("ticker_symbol", "Ticker symbol must be at most 10 characters"))
            }
            Some(_) => {}
        }

        match self.number_of_shares {
            None => errors.push(FieldError::new("number_of_shares", "Number of shares is required")),
            Some(n) if n <= 0 => errors.push(FieldError::new("number_of_shares", "Number of shares must be positive")),
            Some(_) => {}
        }

        match self.buy_price {
            None => errors.push(FieldError::new("buy_price", "Buy price is required")),
            Some(p) if !(p > 0.0) => errors.push(FieldError::new("buy_price", "Buy price must be positive")),
            Some(_) => {}
        }

        if let Some(p) = self.sell_price {
            if !(p >= 0.0) {
                errors.push(FieldError::new("sell_price", "Sell price cannot be negative"));
            }
        }

        let trading_type = match self.trading_type.as_deref() {
            None => {
                errors.push(FieldError::new("trading_type", "Trading type is required"));
                None
            }
            Some(raw) => match raw.parse::<TradingType>() {
                Ok(t) => Some(t),
                Err(e) => {
                    errors.push(FieldError::new("trading_type", e));
                    None
                }
            },
        };

        let transaction_type = match self.transaction_type.as_deref() {
            None => TransactionType::default(),
            Some(raw) => raw.parse::<TransactionType>().unwrap_or_else(|e| {
                errors.push(FieldError::new("transaction_type", e));
                TransactionType::default()
            }),
        };

        match (date, ticker, self.number_of_shares, self.buy_price, trading_type) {
            (Some(date), Some(ticker_symbol), Some(number_of_shares), Some(buy_price), Some(trading_type))
                if errors.is_empty() =>
            {
                Ok(NewTrade {
                    date,
                    ticker_symbol,
                    number_of_shares,
                    buy_price,
                    sell_price: self.sell_price,
                    trading_type,
                    transaction_type,
                })
            }
            _ => Err(DomainError::Validation(errors)),
        }
    }

    /// Validate only the fields that were filled in, for partial updates.
    pub fn validate_update(&self) -> Result<TradeUpdate, DomainError> {
        let mut errors = Vec::new();
        let mut update = TradeUpdate::default();

        if let Some(raw) = self.date.as_deref() {
            update.date = parse_form_date(raw, &mut errors);
        }
        if let Some(t) = self.ticker_symbol.as_deref() {
            let t = t.trim().to_uppercase();
            if t.is_empty() {
                errors.push(FieldError::new("ticker_symbol", "Ticker symbol is required"));
            } else {
                update.ticker_symbol = Some(t);
            }
        }
        if let Some(n) = self.number_of_shares {
            if n <= 0 {
                errors.push(FieldError::new("number_of_shares", "Number of shares must be positive"));
            } else {
                update.number_of_shares = Some(n);
            }
        }
        if let Some(p) = self.buy_price {
            if !(p > 0.0) {
                errors.push(FieldError::new("buy_price", "Buy price must be positive"));
            } else {
                update.buy_price = Some(p);
            }
        }
        if let Some(p) = self.sell_price {
            if !(p >= 0.0) {
                errors.push(FieldError::new("sell_price", "Sell price cannot be negative"));
            } else {
                update.sell_price = Some(p);
            }
        }
        if let Some(raw) = self.trading_type.as_deref() {
            match raw.parse::<TradingType>() {
                Ok(t) => update.trading_type = Some(t),
                Err(e) => errors.push(FieldError::new("trading_type", e)),
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }
        if update.is_empty() {
            return Err(DomainError::InvalidInput("Nothing to update".into()));
        }
        Ok(update)
    }
}

pub struct TradeUseCase {
    api: Arc<dyn TradeApi>,
    sequencer: Arc<RequestSequencer>,
}

impl TradeUseCase {
    pub fn new(api: Arc<dyn TradeApi>, sequencer: Arc<RequestSequencer>) -> Self {
        Self { api, sequencer }
    }

    pub async fn add(&self, form: &TradeForm) -> Result<Trade, DomainError> {
        let new_trade = form.validate()?;
        let trade = self.api.create_trade(&new_trade).await?;
        info!("created trade {} ({} x{})", trade.id, trade.ticker_symbol, trade.number_of_shares);
        Ok(trade)
    }

    pub async fn update(&self, id: &str, form: &TradeForm) -> Result<Trade, DomainError> {
        let update = form.validate_update()?;
        self.api.update_trade(id, &update).await
    }

    pub async fn get(&self, id: &str) -> Result<Trade, DomainError> {
        self.api.get_trade(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.api.delete_trade(id).await?;
        info!("deleted trade {id}");
        Ok(())
    }

    pub async fn list(&self, filter: &TradeFilter) -> Result<Vec<Trade>, DomainError> {
        self.api.list_trades(filter).await
    }

    /// The trades endpoint is unpaged: type, status and dates are filtered
    /// server-side, ticker search and paging happen here.
    pub async fn page(&self, query: &ListQuery) -> Result<Page<Trade>, DomainError> {
        let trades = self.api.list_trades(&query.trade_filter()?).await?;
        Ok(filter_and_paginate(&trades, query))
    }

    /// `page` guarded by the sequencer. `None` means a newer trades request
    /// overtook this one and its result must not be shown.
    pub async fn load(&self, query: &ListQuery) -> Option<Result<Page<Trade>, DomainError>> {
        self.sequencer.run(RequestCategory::Trades, self.page(query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> TradeForm {
        TradeForm {
            date: Some("2026-02-03".into()),
            ticker_symbol: Some(" nvda ".into()),
            number_of_shares: Some(15),
            buy_price: Some(120.5),
            sell_price: None,
            trading_type: Some("Swing".into()),
            transaction_type: None,
        }
    }

    #[test]
    fn valid_form_normalizes_ticker() {
        let trade = complete().validate().unwrap();
        assert_eq!(trade.ticker_symbol, "NVDA");
        assert_eq!(trade.transaction_type, TransactionType::Stock);
        assert!(trade.sell_price.is_none());
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let err = TradeForm::default().validate().unwrap_err();
        let DomainError::Validation(fields) = err else { panic!("expected validation error") };
        let names: Vec<_> = fields.iter().map(|f| f.field).collect();
        assert_eq!(
            names,
            vec!["date", "ticker_symbol", "number_of_shares", "buy_price", "trading_type"]
        );
    }

    #[test]
    fn bad_values_block_submission() {
        let form = TradeForm {
            number_of_shares: Some(0),
            trading_type: Some("Scalp".into()),
            date: Some("02/03/2026".into()),
            ..complete()
        };
        let DomainError::Validation(fields) = form.validate().unwrap_err() else {
            panic!("expected validation error")
        };
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn update_needs_at_least_one_field() {
        assert!(matches!(
            TradeForm::default().validate_update(),
            Err(DomainError::InvalidInput(_))
        ));
        let update = TradeForm {
            sell_price: Some(130.0),
            ..Default::default()
        }
        .validate_update()
        .unwrap();
        assert_eq!(update.sell_price, Some(130.0));
    }
}
