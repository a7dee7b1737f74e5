use crate::config::Config;
use crate::domain::entities::dashboard::{
    DashboardCharts, DashboardStats, StatementUpload, TradingTypeBreakdown, UploadSummary,
};
use crate::domain::entities::insights::InsightsFetch;
use crate::domain::entities::journal_entry::{JournalEntry, JournalPage, JournalUpdate, NewJournalEntry};
use crate::domain::entities::position::{Position, PositionDetail};
use crate::domain::entities::session::{Session, SessionContext};
use crate::domain::entities::trade::{NewTrade, Trade, TradeUpdate};
use crate::domain::entities::user::{Credentials, SignupReceipt, User};
use crate::domain::error::DomainError;
use crate::domain::ports::auth_api::AuthApi;
use crate::domain::ports::dashboard_api::DashboardApi;
use crate::domain::ports::insights_api::InsightsApi;
use crate::domain::ports::journal_api::{JournalApi, JournalFilter};
use crate::domain::ports::trade_api::{PositionFilter, TradeApi, TradeFilter};
use crate::domain::values::trading_type::TradingType;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// REST adapter for the trading journal backend.
///
/// Every call goes through `send`, which attaches the session token, unwraps
/// the `{success, ...}` envelope and turns any failure into a `DomainError`
/// that still carries the response body.
pub struct HttpJournalApi {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl HttpJournalApi {
    pub fn new(config: &Config, session: SessionContext) -> Result<Self, DomainError> {
        let client = Client::builder()
            .user_agent(concat!("TradeJournal/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::Network(format!("HTTP client error: {e}")))?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return `(status, body)` without judging the status.
    async fn exchange(&self, builder: RequestBuilder) -> Result<(u16, Value), DomainError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;
        debug!("<- {status} ({} bytes)", text.len());
        if text.trim().is_empty() {
            return Ok((status, Value::Null));
        }
        match serde_json::from_str(&text) {
            Ok(body) => Ok((status, body)),
            Err(_) if !(200..300).contains(&status) => Ok((status, Value::Null)),
            Err(e) => Err(DomainError::Parse(format!("Invalid JSON from backend: {e}"))),
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, DomainError> {
        let (status, body) = self.exchange(builder).await?;
        let rejected = body.get("success").and_then(Value::as_bool) == Some(false);
        if !(200..300).contains(&status) || rejected {
            return Err(DomainError::from_response(status, body));
        }
        Ok(body)
    }

    async fn insights(&self, path: &str) -> InsightsFetch {
        match self.exchange(self.request(Method::GET, path)).await {
            Ok((status, body)) => InsightsFetch::from_response(status, &body),
            Err(e) => InsightsFetch::failed(e.to_string()),
        }
    }
}

/// Pull `key` out of an envelope and deserialize it.
fn field<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T, DomainError> {
    let value = body
        .get(key)
        .ok_or_else(|| DomainError::Parse(format!("Response is missing '{key}'")))?;
    serde_json::from_value(value.clone()).map_err(|e| DomainError::Parse(format!("Bad '{key}' in response: {e}")))
}

fn message(body: &Value, fallback: &str) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

fn type_param(trading_type: Option<TradingType>) -> Vec<(&'static str, String)> {
    trading_type
        .map(|t| vec![("trading_type", t.to_string())])
        .unwrap_or_default()
}

#[async_trait]
impl TradeApi for HttpJournalApi {
    async fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<Trade>, DomainError> {
        let body = self
            .send(self.request(Method::GET, "/api/trades/").query(&filter.to_params()))
            .await?;
        field(&body, "trades")
    }

    async fn get_trade(&self, id: &str) -> Result<Trade, DomainError> {
        let body = self.send(self.request(Method::GET, &format!("/api/trades/{id}"))).await?;
        field(&body, "trade")
    }

    async fn create_trade(&self, trade: &NewTrade) -> Result<Trade, DomainError> {
        let body = self.send(self.request(Method::POST, "/api/trades/").json(trade)).await?;
        field(&body, "trade")
    }

    async fn update_trade(&self, id: &str, update: &TradeUpdate) -> Result<Trade, DomainError> {
        let body = self
            .send(self.request(Method::PUT, &format!("/api/trades/{id}")).json(update))
            .await?;
        field(&body, "trade")
    }

    async fn delete_trade(&self, id: &str) -> Result<(), DomainError> {
        self.send(self.request(Method::DELETE, &format!("/api/trades/{id}"))).await?;
        Ok(())
    }

    async fn list_positions(&self, filter: &PositionFilter) -> Result<Vec<Position>, DomainError> {
        let body = self
            .send(self.request(Method::GET, "/api/trades/positions/").query(&filter.to_params()))
            .await?;
        field(&body, "positions")
    }

    async fn get_position(&self, id: &str) -> Result<PositionDetail, DomainError> {
        let body = self
            .send(self.request(Method::GET, &format!("/api/trades/positions/{id}")))
            .await?;
        Ok(PositionDetail {
            position: field(&body, "position")?,
            trades: body.get("trades").map(|_| field(&body, "trades")).transpose()?.unwrap_or_default(),
        })
    }

    async fn delete_position(&self, id: &str) -> Result<String, DomainError> {
        let body = self
            .send(self.request(Method::DELETE, &format!("/api/trades/positions/{id}")))
            .await?;
        Ok(message(&body, "Position deleted"))
    }
}

#[async_trait]
impl JournalApi for HttpJournalApi {
    async fn list_entries(&self, filter: &JournalFilter) -> Result<JournalPage, DomainError> {
        let body = self
            .send(self.request(Method::GET, "/api/journal/").query(&filter.to_params()))
            .await?;
        Ok(JournalPage {
            entries: field(&body, "entries")?,
            pagination: match body.get("pagination") {
                Some(Value::Null) | None => None,
                Some(_) => Some(field(&body, "pagination")?),
            },
        })
    }

    async fn get_entry(&self, id: &str) -> Result<JournalEntry, DomainError> {
        let body = self.send(self.request(Method::GET, &format!("/api/journal/{id}"))).await?;
        field(&body, "entry")
    }

    async fn create_entry(&self, entry: &NewJournalEntry) -> Result<JournalEntry, DomainError> {
        let body = self.send(self.request(Method::POST, "/api/journal/").json(entry)).await?;
        field(&body, "entry")
    }

    async fn update_entry(&self, id: &str, update: &JournalUpdate) -> Result<JournalEntry, DomainError> {
        let body = self
            .send(self.request(Method::PUT, &format!("/api/journal/{id}")).json(update))
            .await?;
        field(&body, "entry")
    }

    async fn delete_entry(&self, id: &str) -> Result<(), DomainError> {
        self.send(self.request(Method::DELETE, &format!("/api/journal/{id}"))).await?;
        Ok(())
    }
}

#[async_trait]
impl InsightsApi for HttpJournalApi {
    async fn stored_insights(&self) -> InsightsFetch {
        self.insights("/api/journal/stored-insights").await
    }

    async fn generate_insights(&self) -> InsightsFetch {
        self.insights("/api/journal/insights").await
    }
}

#[async_trait]
impl DashboardApi for HttpJournalApi {
    async fn stats(&self, trading_type: Option<TradingType>) -> Result<DashboardStats, DomainError> {
        let body = self
            .send(self.request(Method::GET, "/api/dashboard/stats").query(&type_param(trading_type)))
            .await?;
        field(&body, "stats")
    }

    async fn chart(&self, trading_type: Option<TradingType>) -> Result<DashboardCharts, DomainError> {
        let body = self
            .send(self.request(Method::GET, "/api/dashboard/chart").query(&type_param(trading_type)))
            .await?;
        serde_json::from_value(body).map_err(|e| DomainError::Parse(format!("Bad chart data: {e}")))
    }

    async fn trading_type_stats(&self) -> Result<TradingTypeBreakdown, DomainError> {
        let body = self
            .send(self.request(Method::GET, "/api/dashboard/trading-type-stats"))
            .await?;
        serde_json::from_value(body).map_err(|e| DomainError::Parse(format!("Bad trading type stats: {e}")))
    }

    async fn upload_statement(&self, upload: &StatementUpload) -> Result<UploadSummary, DomainError> {
        let part = reqwest::multipart::Part::bytes(upload.contents.clone())
            .file_name(upload.file_name.clone())
            .mime_str("text/csv")
            .map_err(|e| DomainError::InvalidInput(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("platform", upload.platform.to_string())
            .part("file", part);
        let body = self
            .send(self.request(Method::POST, "/api/dashboard/upload-statement").multipart(form))
            .await?;
        serde_json::from_value(body).map_err(|e| DomainError::Parse(format!("Bad upload summary: {e}")))
    }
}

#[async_trait]
impl AuthApi for HttpJournalApi {
    async fn signup(&self, credentials: &Credentials) -> Result<SignupReceipt, DomainError> {
        let body = self
            .send(self.request(Method::POST, "/api/auth/signup").json(credentials))
            .await?;
        serde_json::from_value(body).map_err(|e| DomainError::Parse(format!("Bad signup response: {e}")))
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session, DomainError> {
        let body = self
            .send(self.request(Method::POST, "/api/auth/login").json(credentials))
            .await?;
        let token: String = field(&body, "token")?;
        let user = body.get("user").map(|_| field::<User>(&body, "user")).transpose()?;
        Ok(Session::new(token, user))
    }

    async fn logout(&self) -> Result<(), DomainError> {
        self.send(self.request(Method::POST, "/api/auth/logout")).await?;
        Ok(())
    }

    async fn me(&self) -> Result<User, DomainError> {
        let body = self.send(self.request(Method::GET, "/api/auth/me")).await?;
        field(&body, "user")
    }

    async fn confirm_email(&self, token: &str) -> Result<String, DomainError> {
        let body = self
            .send(self.request(Method::POST, "/api/auth/confirm-email").json(&json!({ "token": token })))
            .await?;
        Ok(message(&body, "Email confirmed"))
    }

    async fn resend_confirmation(&self, email: &str) -> Result<String, DomainError> {
        let body = self
            .send(self.request(Method::POST, "/api/auth/resend-confirmation").json(&json!({ "email": email })))
            .await?;
        Ok(message(&body, "Confirmation email sent"))
    }

    async fn change_password(&self, current_password: &str, new_password: &str) -> Result<String, DomainError> {
        let body = self
            .send(self.request(Method::POST, "/api/auth/change-password").json(&json!({
                "current_password": current_password,
                "new_password": new_password,
            })))
            .await?;
        Ok(message(&body, "Password changed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_reports_missing_key() {
        let err = field::<Vec<Trade>>(&json!({"success": true}), "trades").unwrap_err();
        assert!(matches!(err, DomainError::Parse(ref m) if m.contains("trades")));
    }

    #[test]
    fn field_unwraps_envelope() {
        let body = json!({"success": true, "trades": [{
            "id": "1", "date": "2026-01-05", "ticker_symbol": "ABC", "number_of_shares": 10,
            "buy_price": 10.0, "sell_price": null, "trading_type": "Swing", "status": "OPEN",
            "win_loss": null, "shares_remaining": 10
        }]});
        let trades: Vec<Trade> = field(&body, "trades").unwrap();
        assert_eq!(trades[0].ticker_symbol, "ABC");
        assert_eq!(trades[0].shares_remaining, Some(10));
    }

    #[test]
    fn token_is_attached_once_logged_in() {
        let session = SessionContext::new();
        let api = HttpJournalApi::new(&Config::default(), session.clone()).unwrap();
        let req = api.request(Method::GET, "/api/auth/me").build().unwrap();
        assert!(req.headers().get("authorization").is_none());

        session.begin(Session::new("abc", None));
        let req = api.request(Method::GET, "/api/auth/me").build().unwrap();
        assert_eq!(req.headers()["authorization"], "Bearer abc");
        assert_eq!(req.url().as_str(), "http://localhost:5001/api/auth/me");
    }
}
