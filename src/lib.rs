pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::auth::AuthUseCase;
use crate::application::dashboard::DashboardUseCase;
use crate::application::insights::{Eligibility, InsightsPanel, InsightsUseCase};
use crate::application::journal::{JournalForm, JournalUseCase};
use crate::application::list_view::{ListQuery, Page};
use crate::application::positions::PositionsUseCase;
use crate::application::sequencer::RequestSequencer;
use crate::application::trade::{TradeForm, TradeUseCase};
use crate::config::Config;
use crate::domain::entities::dashboard::{DashboardCharts, DashboardStats, TradingTypeBreakdown, UploadSummary};
use crate::domain::entities::journal_entry::JournalEntry;
use crate::domain::entities::position::{Position, PositionDetail};
use crate::domain::entities::session::{Session, SessionContext};
use crate::domain::entities::trade::Trade;
use crate::domain::entities::user::{SignupReceipt, User};
use crate::domain::error::DomainError;
use crate::domain::ports::auth_api::AuthApi;
use crate::domain::ports::dashboard_api::DashboardApi;
use crate::domain::ports::insights_api::InsightsApi;
use crate::domain::ports::journal_api::JournalApi;
use crate::domain::ports::session_store::SessionStore;
use crate::domain::ports::trade_api::{PositionFilter, TradeApi, TradeFilter};
use crate::domain::values::trading_type::TradingType;
use crate::infrastructure::http::client::HttpJournalApi;
use crate::infrastructure::memory::backend::InMemoryJournalApi;
use crate::infrastructure::sqlite::session_store::SqliteSessionStore;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

pub struct TradeJournal {
    auth_uc: AuthUseCase,
    trade_uc: TradeUseCase,
    positions_uc: PositionsUseCase,
    journal_uc: JournalUseCase,
    insights_uc: InsightsUseCase,
    dashboard_uc: DashboardUseCase,
}

impl TradeJournal {
    /// Talk to the REST backend at `config.api_url`, keeping the session in
    /// the SQLite file at `config.session_db`.
    pub fn new(config: &Config) -> Result<Self, DomainError> {
        let session = SessionContext::new();
        let api = Arc::new(HttpJournalApi::new(config, session.clone())?);
        let store = Arc::new(SqliteSessionStore::open(&config.session_db)?);
        Ok(Self::with_backend(api, store, session))
    }

    /// Offline instance on an in-process backend with nothing persisted. The
    /// backend handle is returned so callers can seed plans and pin its clock.
    pub fn in_memory() -> Result<(Self, Arc<InMemoryJournalApi>), DomainError> {
        let session = SessionContext::new();
        let backend = Arc::new(InMemoryJournalApi::new(session.clone()));
        let store = Arc::new(SqliteSessionStore::in_memory()?);
        Ok((Self::with_backend(backend.clone(), store, session), backend))
    }

    /// Wire every use case to one backend. `session` must be the same context
    /// the backend reads its token from.
    pub fn with_backend<B>(backend: Arc<B>, store: Arc<dyn SessionStore>, session: SessionContext) -> Self
    where
        B: TradeApi + JournalApi + InsightsApi + DashboardApi + AuthApi + 'static,
    {
        let sequencer = Arc::new(RequestSequencer::new());
        let trade_api: Arc<dyn TradeApi> = backend.clone();
        let journal_api: Arc<dyn JournalApi> = backend.clone();
        let insights_api: Arc<dyn InsightsApi> = backend.clone();
        let dashboard_api: Arc<dyn DashboardApi> = backend.clone();
        let auth_api: Arc<dyn AuthApi> = backend;

        Self {
            auth_uc: AuthUseCase::new(auth_api, store, session),
            trade_uc: TradeUseCase::new(trade_api.clone(), sequencer.clone()),
            positions_uc: PositionsUseCase::new(trade_api),
            journal_uc: JournalUseCase::new(journal_api, sequencer.clone()),
            insights_uc: InsightsUseCase::new(insights_api, sequencer.clone()),
            dashboard_uc: DashboardUseCase::new(dashboard_api, sequencer),
        }
    }

    // Auth

    pub async fn restore(&self) -> Result<Option<Session>, DomainError> {
        self.auth_uc.restore().await
    }

    pub async fn signup(&self, email: &str, password: &str, confirm: &str) -> Result<SignupReceipt, DomainError> {
        self.auth_uc.signup(email, password, confirm).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        self.auth_uc.login(email, password).await
    }

    pub async fn logout(&self) -> Result<(), DomainError> {
        self.auth_uc.logout().await
    }

    pub async fn whoami(&self) -> Result<User, DomainError> {
        self.auth_uc.me().await
    }

    pub fn session(&self) -> Option<Session> {
        self.auth_uc.current()
    }

    pub async fn confirm_email(&self, token: &str) -> Result<String, DomainError> {
        self.auth_uc.confirm_email(token).await
    }

    pub async fn resend_confirmation(&self, email: &str) -> Result<String, DomainError> {
        self.auth_uc.resend_confirmation(email).await
    }

    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> Result<String, DomainError> {
        self.auth_uc.change_password(current, new, confirm).await
    }

    // Trades

    pub async fn trades(&self, query: &ListQuery) -> Result<Page<Trade>, DomainError> {
        self.trade_uc.page(query).await
    }

    pub async fn load_trades(&self, query: &ListQuery) -> Option<Result<Page<Trade>, DomainError>> {
        self.trade_uc.load(query).await
    }

    pub async fn trade(&self, id: &str) -> Result<Trade, DomainError> {
        self.trade_uc.get(id).await
    }

    pub async fn trade_add(&self, form: &TradeForm) -> Result<Trade, DomainError> {
        self.trade_uc.add(form).await
    }

    pub async fn trade_update(&self, id: &str, form: &TradeForm) -> Result<Trade, DomainError> {
        self.trade_uc.update(id, form).await
    }

    pub async fn trade_delete(&self, id: &str) -> Result<(), DomainError> {
        self.trade_uc.delete(id).await
    }

    // Positions

    pub async fn positions(&self, filter: &PositionFilter) -> Result<Vec<Position>, DomainError> {
        self.positions_uc.list(filter).await
    }

    pub async fn position(&self, id: &str) -> Result<PositionDetail, DomainError> {
        self.positions_uc.detail(id).await
    }

    pub async fn position_delete(&self, id: &str) -> Result<String, DomainError> {
        self.positions_uc.delete(id).await
    }

    pub async fn derive_positions(&self, filter: &TradeFilter) -> Result<Vec<Position>, DomainError> {
        self.positions_uc.derive(filter).await
    }

    pub async fn derive_position(&self, symbol: &str) -> Result<Position, DomainError> {
        self.positions_uc.derive_symbol(symbol).await
    }

    // Journal

    pub async fn journal(&self, query: &ListQuery) -> Result<Page<JournalEntry>, DomainError> {
        self.journal_uc.page(query).await
    }

    pub async fn load_journal(&self, query: &ListQuery) -> Option<Result<Page<JournalEntry>, DomainError>> {
        self.journal_uc.load(query).await
    }

    pub async fn journal_for_trade(&self, trade_id: &str) -> Result<Vec<JournalEntry>, DomainError> {
        self.journal_uc.for_trade(trade_id).await
    }

    pub async fn journal_entry(&self, id: &str) -> Result<JournalEntry, DomainError> {
        self.journal_uc.get(id).await
    }

    pub async fn journal_add(&self, form: &JournalForm) -> Result<JournalEntry, DomainError> {
        self.journal_uc.add(form).await
    }

    pub async fn journal_update(&self, id: &str, form: &JournalForm) -> Result<JournalEntry, DomainError> {
        self.journal_uc.update(id, form).await
    }

    pub async fn journal_delete(&self, id: &str) -> Result<(), DomainError> {
        self.journal_uc.delete(id).await
    }

    // Insights

    pub async fn insights(&self, now: DateTime<Utc>) -> Result<InsightsPanel, DomainError> {
        self.insights_uc.stored(now).await
    }

    pub async fn insights_refresh(&self, now: DateTime<Utc>) -> Result<InsightsPanel, DomainError> {
        self.insights_uc.refresh(now).await
    }

    pub fn insights_eligibility(&self, now: DateTime<Utc>) -> Result<Eligibility, DomainError> {
        self.insights_uc.eligibility(now)
    }

    // Dashboard

    pub async fn stats(&self, trading_type: Option<TradingType>) -> Result<DashboardStats, DomainError> {
        self.dashboard_uc.stats(trading_type).await
    }

    pub async fn chart(&self, trading_type: Option<TradingType>) -> Result<DashboardCharts, DomainError> {
        self.dashboard_uc.chart(trading_type).await
    }

    pub async fn dashboard(
        &self,
        trading_type: Option<TradingType>,
    ) -> Option<Result<(DashboardStats, DashboardCharts), DomainError>> {
        self.dashboard_uc.load(trading_type).await
    }

    pub async fn type_stats(&self) -> Result<TradingTypeBreakdown, DomainError> {
        self.dashboard_uc.type_stats().await
    }

    pub async fn upload(&self, platform: &str, path: &Path) -> Result<UploadSummary, DomainError> {
        self.dashboard_uc.upload(platform, path).await
    }
}
