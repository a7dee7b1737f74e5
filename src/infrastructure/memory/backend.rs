//! Offline stand-in for the journal backend.
//!
//! Mirrors the REST API's observable behavior closely enough to drive the
//! application layer end to end: per-user data, bearer-token checks, FIFO
//! position bookkeeping, plan cooldowns for insights and the same error
//! bodies the real server sends.

use crate::application::list_view::paginate;
use crate::application::positions::aggregate_all;
use crate::domain::entities::dashboard::{
    ChartData, DashboardCharts, DashboardStats, StatementUpload, TradingTypeBreakdown, TradingTypeStats,
    UploadSummary,
};
use crate::domain::entities::insights::{AiInsights, InsightsFetch, PlanInfo};
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
use crate::domain::values::entry_type::EntryType;
use crate::domain::values::plan_tier::PlanTier;
use crate::domain::values::trade_status::TradeStatus;
use crate::domain::values::trading_type::TradingType;
use crate::domain::values::win_loss::WinLoss;
use crate::infrastructure::memory::statement::{parse_thinkorswim, Side};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const RECENT_DAYS: i64 = 30;

struct Account {
    id: String,
    email: String,
    password: String,
    is_confirmed: bool,
    plan: PlanTier,
    confirmation_token: Option<String>,
    created_at: DateTime<Utc>,
}

struct Owned<T> {
    owner: String,
    item: T,
}

struct StoredInsights {
    insights: AiInsights,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    trades: Vec<Owned<Trade>>,
    entries: Vec<Owned<JournalEntry>>,
    insights: HashMap<String, StoredInsights>,
    clock: Option<DateTime<Utc>>,
}

impl State {
    fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }

    fn account(&self, id: &str) -> Result<&Account, DomainError> {
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| auth_error(401, "User not found"))
    }

    fn trades_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Trade> + 'a {
        self.trades.iter().filter(move |t| t.owner == owner).map(|t| &t.item)
    }

    fn entries_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a JournalEntry> + 'a {
        self.entries.iter().filter(move |e| e.owner == owner).map(|e| &e.item)
    }

    fn positions(&self, owner: &str) -> Vec<Position> {
        let trades: Vec<Trade> = self.trades_of(owner).cloned().collect();
        aggregate_all(&trades)
            .into_iter()
            .map(|mut p| {
                p.id = Some(position_id(&p.symbol));
                p
            })
            .collect()
    }

    fn plan_info(&self, owner: &str) -> Result<PlanInfo, DomainError> {
        let account = self.account(owner)?;
        let now = self.now();
        let last = self.insights.get(owner).map(|s| s.created_at);
        let next = last.map(|l| l + Duration::days(account.plan.cooldown_days()));
        Ok(PlanInfo {
            plan: account.plan,
            can_get_insights: Some(next.map_or(true, |n| n <= now)),
            last_insights_date: last.map(|d| d.to_rfc3339()),
            next_available_date: next.map(|d| d.to_rfc3339()),
        })
    }

    fn user(&self, owner: &str) -> Result<User, DomainError> {
        let account = self.account(owner)?;
        let plan = self.plan_info(owner)?;
        Ok(User {
            id: account.id.clone(),
            email: account.email.clone(),
            is_confirmed: account.is_confirmed,
            plan: account.plan,
            last_ai_insights_date: plan.last_insights_date,
            next_ai_insights_date: plan.next_available_date,
            can_get_ai_insights: plan.can_get_insights,
            created_at: Some(account.created_at.to_rfc3339()),
        })
    }

    /// Re-run FIFO matching for one symbol and write the results back onto
    /// its legs: remaining shares, status, P&L and win/loss.
    fn rebalance(&mut self, owner: &str, symbol: &str) {
        let pos_id = position_id(symbol);
        let mut legs: Vec<&mut Trade> = self
            .trades
            .iter_mut()
            .filter(|t| t.owner == owner && t.item.ticker_symbol.eq_ignore_ascii_case(symbol))
            .map(|t| &mut t.item)
            .collect();
        legs.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.is_closing_leg().cmp(&b.is_closing_leg()))
        });

        let mut open: VecDeque<(usize, i64)> = VecDeque::new();
        for i in 0..legs.len() {
            legs[i].position_id = Some(pos_id.clone());
            let shares = legs[i].number_of_shares;
            legs[i].price_cost_basis = legs[i].buy_price.map(|p| p * shares as f64);
            legs[i].proceeds = legs[i].sell_price.map(|p| p * shares as f64);
            match (legs[i].buy_price, legs[i].sell_price) {
                (Some(_), None) => {
                    legs[i].shares_remaining = Some(shares);
                    legs[i].status = TradeStatus::Open;
                    legs[i].win_loss = None;
                    legs[i].pnl = None;
                    open.push_back((i, shares));
                }
                (None, Some(sell)) => {
                    let mut wanted = shares;
                    let mut matched = 0;
                    let mut cost = 0.0;
                    while wanted > 0 {
                        let Some(front) = open.front_mut() else { break };
                        let take = front.1.min(wanted);
                        cost += take as f64 * legs[front.0].buy_price.unwrap_or(0.0);
                        matched += take;
                        wanted -= take;
                        front.1 -= take;
                        let (idx, left) = *front;
                        legs[idx].shares_remaining = Some(left);
                        if left == 0 {
                            legs[idx].status = TradeStatus::Closed;
                            open.pop_front();
                        }
                    }
                    let pnl = sell * matched as f64 - cost;
                    legs[i].pnl = Some(pnl);
                    legs[i].price_cost_basis = Some(cost);
                    legs[i].shares_remaining = Some(0);
                    legs[i].status = TradeStatus::Closed;
                    legs[i].win_loss = Some(if pnl > 0.0 { WinLoss::Win } else { WinLoss::Loss });
                }
                (Some(buy), Some(sell)) => {
                    legs[i].shares_remaining = Some(0);
                    legs[i].status = TradeStatus::Closed;
                    legs[i].pnl = None;
                    legs[i].win_loss = Some(if sell > buy { WinLoss::Win } else { WinLoss::Loss });
                }
                (None, None) => {}
            }
        }
    }
}

fn position_id(symbol: &str) -> String {
    format!("POS_{}", symbol.to_uppercase())
}

/// Error body in the `{success: false, error}` shape used by data routes.
fn api_error(status: u16, message: &str) -> DomainError {
    DomainError::from_response(status, json!({ "success": false, "error": message }))
}

/// Error body in the `{message}` shape used by auth routes.
fn auth_error(status: u16, message: &str) -> DomainError {
    DomainError::from_response(status, json!({ "message": message }))
}

fn plan_fields(plan: &PlanInfo, body: &mut Map<String, Value>) {
    body.insert("plan".into(), json!(plan.plan));
    body.insert("can_get_insights".into(), json!(plan.can_get_insights));
    body.insert("last_insights_date".into(), json!(plan.last_insights_date));
    body.insert("next_available_date".into(), json!(plan.next_available_date));
}

fn type_stats<'a>(trades: impl Iterator<Item = &'a Trade>) -> TradingTypeStats {
    let closed: Vec<&Trade> = trades.filter(|t| t.status == TradeStatus::Closed).collect();
    let win_count = closed.iter().filter(|t| t.win_loss == Some(WinLoss::Win)).count() as u64;
    let loss_count = closed.iter().filter(|t| t.win_loss == Some(WinLoss::Loss)).count() as u64;
    let total_profit_loss: f64 = closed.iter().filter_map(|t| t.realized_pnl()).sum();
    TradingTypeStats {
        total_trades: closed.len() as u64,
        win_count,
        loss_count,
        total_profit_loss: round2(total_profit_loss),
        win_rate: percent(win_count, closed.len()),
    }
}

fn percent(part: u64, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// In-process journal backend keyed off the shared `SessionContext`, so it
/// sees exactly the token the HTTP adapter would send.
pub struct InMemoryJournalApi {
    state: Mutex<State>,
    session: SessionContext,
}

impl InMemoryJournalApi {
    pub fn new(session: SessionContext) -> Self {
        Self {
            state: Mutex::new(State::default()),
            session,
        }
    }

    /// Pin the backend clock. Insight cooldowns are measured against it.
    pub fn set_clock(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.lock()?.clock = Some(now);
        Ok(())
    }

    pub fn set_plan(&self, email: &str, plan: PlanTier) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| auth_error(404, "User not found"))?;
        account.plan = plan;
        Ok(())
    }

    /// The token a confirmation email would have carried.
    pub fn confirmation_token(&self, email: &str) -> Result<Option<String>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .and_then(|a| a.confirmation_token.clone()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::InvalidInput(format!("backend state poisoned: {e}")))
    }

    /// Resolve the caller from the bearer token, like `@require_auth`.
    fn caller(&self, state: &State) -> Result<String, DomainError> {
        let token = self
            .session
            .token()
            .ok_or_else(|| auth_error(401, "Token is missing"))?;
        state
            .tokens
            .get(&token)
            .cloned()
            .ok_or_else(|| auth_error(401, "Token is invalid"))
    }

    fn insights_response(&self, generate: bool) -> Result<(u16, Value), DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        let plan = state.plan_info(&owner)?;
        let mut body = Map::new();

        if generate {
            if plan.can_get_insights != Some(true) {
                body.insert("success".into(), json!(false));
                body.insert(
                    "error".into(),
                    json!(format!(
                        "AI insights are limited to once every {} days on the {} plan",
                        plan.plan.cooldown_days(),
                        plan.plan
                    )),
                );
                plan_fields(&plan, &mut body);
                return Ok((429, Value::Object(body)));
            }
            if state.entries_of(&owner).next().is_none() {
                body.insert("success".into(), json!(true));
                body.insert("insights".into(), json!("No journal entries found to analyze."));
                plan_fields(&plan, &mut body);
                return Ok((200, Value::Object(body)));
            }
            let now = state.now();
            let insights = AiInsights {
                created_at: Some(now.to_rfc3339()),
                ..analyze(&state, &owner)
            };
            state.insights.insert(
                owner.clone(),
                StoredInsights {
                    insights,
                    created_at: now,
                },
            );
            debug!("generated insights for {owner}");
        }

        let plan = state.plan_info(&owner)?;
        plan_fields(&plan, &mut body);
        match state.insights.get(&owner) {
            Some(stored) => {
                body.insert("success".into(), json!(true));
                body.insert("insights".into(), json!(stored.insights));
                body.insert("insights_created_at".into(), json!(stored.created_at.to_rfc3339()));
                Ok((200, Value::Object(body)))
            }
            None => {
                body.insert("success".into(), json!(false));
                body.insert("error".into(), json!("No insights generated yet"));
                Ok((404, Value::Object(body)))
            }
        }
    }
}

/// Deterministic summary of a user's journal and closed trades.
fn analyze(state: &State, owner: &str) -> AiInsights {
    let entries: Vec<&JournalEntry> = state.entries_of(owner).collect();
    let linked = entries.iter().filter(|e| e.trade_id.is_some()).count();
    let stats = type_stats(state.trades_of(owner));

    let mut by_symbol: BTreeMap<String, usize> = BTreeMap::new();
    for trade in state.trades_of(owner) {
        *by_symbol.entry(trade.ticker_symbol.clone()).or_default() += 1;
    }
    let busiest = by_symbol.iter().max_by_key(|(_, n)| **n).map(|(s, n)| (s.clone(), *n));

    let mut key_patterns = vec![format!(
        "{} journal entries, {} linked to specific trades",
        entries.len(),
        linked
    )];
    if let Some((symbol, n)) = busiest {
        key_patterns.push(format!("{symbol} is your most traded symbol ({n} trades)"));
    }

    let mut strengths = Vec::new();
    let mut areas_for_improvement = Vec::new();
    if stats.total_trades > 0 && stats.win_rate >= 50.0 {
        strengths.push(format!("Win rate of {:.1}% across {} closed trades", stats.win_rate, stats.total_trades));
    } else if stats.total_trades > 0 {
        areas_for_improvement.push(format!("Win rate is {:.1}%; review entries on losing trades", stats.win_rate));
    }
    if linked * 2 < entries.len() {
        areas_for_improvement.push("Most notes are not linked to a trade".to_string());
    } else {
        strengths.push("Notes are consistently tied to trades".to_string());
    }

    AiInsights {
        key_patterns,
        strengths,
        areas_for_improvement,
        emotional_state_analysis: None,
        trading_performance_insights: Some(format!(
            "{} wins, {} losses, realized P&L {:.2}",
            stats.win_count, stats.loss_count, stats.total_profit_loss
        )),
        recommendations: vec!["Write a note for every closed trade".to_string()],
        summary: None,
        created_at: None,
    }
}

#[async_trait]
impl TradeApi for InMemoryJournalApi {
    async fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<Trade>, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        let mut trades: Vec<Trade> = state
            .trades_of(&owner)
            .filter(|t| filter.trading_type.map_or(true, |v| t.trading_type == v))
            .filter(|t| filter.win_loss.map_or(true, |v| t.win_loss == Some(v)))
            .filter(|t| filter.status.map_or(true, |v| t.status == v))
            .filter(|t| filter.transaction_type.map_or(true, |v| t.transaction_type == v))
            .filter(|t| filter.date_from.map_or(true, |d| t.date >= d))
            .filter(|t| filter.date_to.map_or(true, |d| t.date <= d))
            .cloned()
            .collect();
        trades.sort_by(|a, b| b.is_open_leg().cmp(&a.is_open_leg()).then(b.date.cmp(&a.date)));
        Ok(trades)
    }

    async fn get_trade(&self, id: &str) -> Result<Trade, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        let found = state.trades_of(&owner).find(|t| t.id == id).cloned();
        found.ok_or_else(|| api_error(404, "Trade not found"))
    }

    async fn create_trade(&self, new: &NewTrade) -> Result<Trade, DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        let now = state.now().to_rfc3339();
        let trade = Trade {
            id: Uuid::new_v4().to_string(),
            date: new.date,
            ticker_symbol: new.ticker_symbol.to_uppercase(),
            number_of_shares: new.number_of_shares,
            buy_price: Some(new.buy_price),
            sell_price: new.sell_price,
            trading_type: new.trading_type,
            status: TradeStatus::Open,
            transaction_type: new.transaction_type,
            shares_remaining: None,
            price_cost_basis: None,
            proceeds: None,
            win_loss: None,
            position_id: None,
            pnl: None,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        let (id, symbol) = (trade.id.clone(), trade.ticker_symbol.clone());
        state.trades.push(Owned {
            owner: owner.clone(),
            item: trade,
        });
        state.rebalance(&owner, &symbol);
        let created = state.trades_of(&owner).find(|t| t.id == id).cloned();
        created.ok_or_else(|| api_error(500, "Trade vanished after insert"))
    }

    async fn update_trade(&self, id: &str, update: &TradeUpdate) -> Result<Trade, DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        let now = state.now().to_rfc3339();
        let slot = state
            .trades
            .iter_mut()
            .find(|t| t.owner == owner && t.item.id == id)
            .ok_or_else(|| api_error(404, "Trade not found"))?;
        let trade = &mut slot.item;
        let old_symbol = trade.ticker_symbol.clone();
        if let Some(date) = update.date {
            trade.date = date;
        }
        if let Some(symbol) = &update.ticker_symbol {
            trade.ticker_symbol = symbol.to_uppercase();
        }
        if let Some(n) = update.number_of_shares {
            trade.number_of_shares = n;
        }
        if let Some(p) = update.buy_price {
            trade.buy_price = Some(p);
        }
        if let Some(p) = update.sell_price {
            trade.sell_price = Some(p);
        }
        if let Some(t) = update.trading_type {
            trade.trading_type = t;
        }
        trade.updated_at = Some(now);
        let new_symbol = trade.ticker_symbol.clone();

        state.rebalance(&owner, &old_symbol);
        if new_symbol != old_symbol {
            state.rebalance(&owner, &new_symbol);
        }
        let updated = state.trades_of(&owner).find(|t| t.id == id).cloned();
        updated.ok_or_else(|| api_error(404, "Trade not found"))
    }

    async fn delete_trade(&self, id: &str) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        let idx = state
            .trades
            .iter()
            .position(|t| t.owner == owner && t.item.id == id)
            .ok_or_else(|| api_error(404, "Trade not found"))?;
        let removed = state.trades.remove(idx);
        for entry in state.entries.iter_mut().filter(|e| e.owner == owner) {
            if entry.item.trade_id.as_deref() == Some(id) {
                entry.item.trade_id = None;
                entry.item.entry_type = EntryType::General;
            }
        }
        state.rebalance(&owner, &removed.item.ticker_symbol);
        Ok(())
    }

    async fn list_positions(&self, filter: &PositionFilter) -> Result<Vec<Position>, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        let needle = filter.symbol.as_deref().map(str::to_uppercase);
        Ok(state
            .positions(&owner)
            .into_iter()
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .filter(|p| needle.as_deref().map_or(true, |n| p.symbol.contains(n)))
            .collect())
    }

    async fn get_position(&self, id: &str) -> Result<PositionDetail, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        let position = state
            .positions(&owner)
            .into_iter()
            .find(|p| p.id.as_deref() == Some(id))
            .ok_or_else(|| api_error(404, "Position not found"))?;
        let mut trades: Vec<Trade> = state
            .trades_of(&owner)
            .filter(|t| t.ticker_symbol.eq_ignore_ascii_case(&position.symbol))
            .cloned()
            .collect();
        trades.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(PositionDetail { position, trades })
    }

    async fn delete_position(&self, id: &str) -> Result<String, DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        let symbol = state
            .positions(&owner)
            .into_iter()
            .find(|p| p.id.as_deref() == Some(id))
            .map(|p| p.symbol)
            .ok_or_else(|| api_error(404, "Position not found"))?;
        let before = state.trades.len();
        state
            .trades
            .retain(|t| !(t.owner == owner && t.item.ticker_symbol.eq_ignore_ascii_case(&symbol)));
        let removed = before - state.trades.len();
        Ok(format!(
            "Position {symbol} and {removed} associated trades deleted successfully"
        ))
    }
}

#[async_trait]
impl JournalApi for InMemoryJournalApi {
    async fn list_entries(&self, filter: &JournalFilter) -> Result<JournalPage, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut entries: Vec<JournalEntry> = state
            .entries_of(&owner)
            .filter(|e| filter.entry_type.map_or(true, |t| e.entry_type == t))
            .filter(|e| filter.trade_id.as_deref().map_or(true, |id| e.trade_id.as_deref() == Some(id)))
            .filter(|e| filter.date_from.map_or(true, |d| e.date >= d))
            .filter(|e| filter.date_to.map_or(true, |d| e.date <= d))
            .filter(|e| search.as_deref().map_or(true, |s| e.notes.to_lowercase().contains(s)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        if filter.page.is_none() && filter.per_page.is_none() {
            return Ok(JournalPage {
                entries,
                pagination: None,
            });
        }
        let page = paginate(&entries, filter.page.unwrap_or(1), filter.per_page.unwrap_or(10));
        Ok(JournalPage {
            entries: page.items,
            pagination: Some(page.pagination),
        })
    }

    async fn get_entry(&self, id: &str) -> Result<JournalEntry, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        let found = state.entries_of(&owner).find(|e| e.id == id).cloned();
        found.ok_or_else(|| api_error(404, "Journal entry not found"))
    }

    async fn create_entry(&self, new: &NewJournalEntry) -> Result<JournalEntry, DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        if let Some(trade_id) = &new.trade_id {
            if !state.trades_of(&owner).any(|t| &t.id == trade_id) {
                return Err(api_error(404, "Trade not found"));
            }
        }
        let now = state.now().to_rfc3339();
        let entry = JournalEntry {
            id: Uuid::new_v4().to_string(),
            date: new.date,
            notes: new.notes.clone(),
            trade_id: new.trade_id.clone(),
            entry_type: EntryType::for_trade_id(new.trade_id.as_deref()),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        state.entries.push(Owned {
            owner,
            item: entry.clone(),
        });
        Ok(entry)
    }

    async fn update_entry(&self, id: &str, update: &JournalUpdate) -> Result<JournalEntry, DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        if let Some(Some(trade_id)) = &update.trade_id {
            if !state.trades_of(&owner).any(|t| &t.id == trade_id) {
                return Err(api_error(404, "Trade not found"));
            }
        }
        let now = state.now().to_rfc3339();
        let slot = state
            .entries
            .iter_mut()
            .find(|e| e.owner == owner && e.item.id == id)
            .ok_or_else(|| api_error(404, "Journal entry not found"))?;
        let entry = &mut slot.item;
        if let Some(date) = update.date {
            entry.date = date;
        }
        if let Some(notes) = &update.notes {
            entry.notes = notes.clone();
        }
        if let Some(trade_id) = &update.trade_id {
            entry.trade_id = trade_id.clone();
            entry.entry_type = EntryType::for_trade_id(trade_id.as_deref());
        }
        entry.updated_at = Some(now);
        Ok(entry.clone())
    }

    async fn delete_entry(&self, id: &str) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        let idx = state
            .entries
            .iter()
            .position(|e| e.owner == owner && e.item.id == id)
            .ok_or_else(|| api_error(404, "Journal entry not found"))?;
        state.entries.remove(idx);
        Ok(())
    }
}

#[async_trait]
impl InsightsApi for InMemoryJournalApi {
    async fn stored_insights(&self) -> InsightsFetch {
        match self.insights_response(false) {
            Ok((status, body)) => InsightsFetch::from_response(status, &body),
            Err(e) => InsightsFetch::failed(e.to_string()),
        }
    }

    async fn generate_insights(&self) -> InsightsFetch {
        match self.insights_response(true) {
            Ok((status, body)) => InsightsFetch::from_response(status, &body),
            Err(e) => InsightsFetch::failed(e.to_string()),
        }
    }
}

#[async_trait]
impl DashboardApi for InMemoryJournalApi {
    async fn stats(&self, trading_type: Option<TradingType>) -> Result<DashboardStats, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        let trades: Vec<&Trade> = state
            .trades_of(&owner)
            .filter(|t| trading_type.map_or(true, |v| t.trading_type == v))
            .collect();
        let closed = type_stats(trades.iter().copied());
        let cutoff = state.now().date_naive() - Duration::days(RECENT_DAYS);
        let recent = type_stats(trades.iter().copied().filter(|t| t.date >= cutoff));
        Ok(DashboardStats {
            total_trades: trades.len() as u64,
            win_count: closed.win_count,
            loss_count: closed.loss_count,
            win_rate: closed.win_rate,
            total_profit_loss: closed.total_profit_loss,
            avg_profit_loss: if closed.total_trades > 0 {
                round2(closed.total_profit_loss / closed.total_trades as f64)
            } else {
                0.0
            },
            recent_profit_loss: recent.total_profit_loss,
            recent_trades_count: recent.total_trades,
        })
    }

    async fn chart(&self, trading_type: Option<TradingType>) -> Result<DashboardCharts, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        let closed: Vec<&Trade> = state
            .trades_of(&owner)
            .filter(|t| trading_type.map_or(true, |v| t.trading_type == v))
            .filter(|t| t.status == TradeStatus::Closed)
            .collect();
        if state.trades_of(&owner).next().is_none() {
            return Ok(DashboardCharts::default());
        }

        let stats = type_stats(closed.iter().copied());
        let mut donut = ChartData::default();
        for (label, count, color) in [
            ("Win", stats.win_count, "#10B981"),
            ("Loss", stats.loss_count, "#EF4444"),
        ] {
            if count > 0 {
                donut.labels.push(label.into());
                donut.data.push(count as f64);
                donut.background_color.push(color.into());
            }
        }
        if donut.labels.is_empty() {
            donut.labels.push("No Data".into());
            donut.data.push(1.0);
            donut.background_color.push("#6B7280".into());
        }

        let mut daily: BTreeMap<String, f64> = BTreeMap::new();
        for trade in &closed {
            if let Some(pnl) = trade.realized_pnl() {
                *daily.entry(trade.date.format("%Y-%m-%d").to_string()).or_default() += pnl;
            }
        }
        let line = ChartData {
            labels: daily.keys().cloned().collect(),
            data: daily.values().map(|v| round2(*v)).collect(),
            background_color: Vec::new(),
        };
        Ok(DashboardCharts {
            donut_chart: donut,
            line_chart: line,
        })
    }

    async fn trading_type_stats(&self) -> Result<TradingTypeBreakdown, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        Ok(TradingTypeBreakdown {
            swing_stats: type_stats(state.trades_of(&owner).filter(|t| t.trading_type == TradingType::Swing)),
            day_stats: type_stats(state.trades_of(&owner).filter(|t| t.trading_type == TradingType::Day)),
        })
    }

    async fn upload_statement(&self, upload: &StatementUpload) -> Result<UploadSummary, DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        let fills = parse_thinkorswim(&upload.contents).map_err(|e| {
            DomainError::from_response(400, json!({ "error": e }))
        })?;

        let open_before: BTreeSet<String> = state
            .positions(&owner)
            .into_iter()
            .filter(Position::is_open)
            .map(|p| p.symbol)
            .collect();

        let mut summary = UploadSummary {
            num_trades: fills.len() as u64,
            ..Default::default()
        };
        let now = state.now().to_rfc3339();
        let mut touched = BTreeSet::new();
        for fill in &fills {
            let cash = fill.price * fill.quantity as f64;
            let entry = summary.pnl_by_symbol.entry(fill.symbol.clone()).or_insert(0.0);
            match fill.side {
                Side::Buy => *entry -= cash,
                Side::Sell => *entry += cash,
            }
            let same_day_buy = fills
                .iter()
                .any(|f| f.symbol == fill.symbol && f.date == fill.date && f.side == Side::Buy);
            let trading_type = if fill.side == Side::Sell && same_day_buy {
                TradingType::Day
            } else {
                TradingType::Swing
            };
            if fill.side == Side::Sell {
                summary.closed_trades_count += 1;
                match trading_type {
                    TradingType::Day => summary.day_trades += 1,
                    TradingType::Swing => summary.swing_trades += 1,
                }
            }
            state.trades.push(Owned {
                owner: owner.clone(),
                item: Trade {
                    id: Uuid::new_v4().to_string(),
                    date: fill.date,
                    ticker_symbol: fill.symbol.clone(),
                    number_of_shares: fill.quantity,
                    buy_price: (fill.side == Side::Buy).then_some(fill.price),
                    sell_price: (fill.side == Side::Sell).then_some(fill.price),
                    trading_type,
                    status: TradeStatus::Open,
                    transaction_type: Default::default(),
                    shares_remaining: None,
                    price_cost_basis: None,
                    proceeds: None,
                    win_loss: None,
                    position_id: None,
                    pnl: None,
                    created_at: Some(now.clone()),
                    updated_at: Some(now.clone()),
                },
            });
            touched.insert(fill.symbol.clone());
        }
        for symbol in &touched {
            state.rebalance(&owner, symbol);
        }

        let after = state.positions(&owner);
        for position in after.iter().filter(|p| touched.contains(&p.symbol)) {
            let was_open = open_before.contains(&position.symbol);
            if !was_open && position.is_open() {
                summary.new_positions += 1;
            }
            if !position.is_open() {
                summary.closed_positions += 1;
            }
        }
        summary.open_positions_count = after.iter().filter(|p| p.is_open()).count() as u64;
        summary.symbols = summary.pnl_by_symbol.keys().cloned().collect();
        summary.symbols.sort();
        summary.total_pnl = round2(summary.pnl_by_symbol.values().sum());
        debug!("{} imported {} fills from {}", owner, fills.len(), upload.file_name);
        Ok(summary)
    }
}

#[async_trait]
impl AuthApi for InMemoryJournalApi {
    async fn signup(&self, credentials: &Credentials) -> Result<SignupReceipt, DomainError> {
        let mut state = self.lock()?;
        let email = credentials.email.trim().to_lowercase();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(auth_error(400, "Email and password are required"));
        }
        if state.accounts.iter().any(|a| a.email == email) {
            return Err(auth_error(409, "Email already registered"));
        }
        let account = Account {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            password: credentials.password.clone(),
            is_confirmed: false,
            plan: PlanTier::default(),
            confirmation_token: Some(Uuid::new_v4().simple().to_string()),
            created_at: state.now(),
        };
        let receipt = SignupReceipt {
            message: "Registration successful! Please check your email to confirm your account.".into(),
            user_id: Some(account.id.clone()),
            email: Some(email),
            is_confirmed: Some(false),
        };
        state.accounts.push(account);
        Ok(receipt)
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session, DomainError> {
        let mut state = self.lock()?;
        let email = credentials.email.trim().to_lowercase();
        let id = state
            .accounts
            .iter()
            .find(|a| a.email == email && a.password == credentials.password)
            .map(|a| a.id.clone())
            .ok_or_else(|| auth_error(401, "Invalid email or password"))?;
        let token = Uuid::new_v4().simple().to_string();
        state.tokens.insert(token.clone(), id.clone());
        let user = state.user(&id)?;
        Ok(Session::new(token, Some(user)))
    }

    async fn logout(&self) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        if let Some(token) = self.session.token() {
            state.tokens.remove(&token);
        }
        Ok(())
    }

    async fn me(&self) -> Result<User, DomainError> {
        let state = self.lock()?;
        let owner = self.caller(&state)?;
        state.user(&owner)
    }

    async fn confirm_email(&self, token: &str) -> Result<String, DomainError> {
        let mut state = self.lock()?;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.confirmation_token.as_deref() == Some(token))
            .ok_or_else(|| auth_error(400, "Invalid or expired confirmation token"))?;
        if account.is_confirmed {
            return Err(auth_error(400, "Email already confirmed"));
        }
        account.is_confirmed = true;
        account.confirmation_token = None;
        Ok("Email confirmed successfully".into())
    }

    async fn resend_confirmation(&self, email: &str) -> Result<String, DomainError> {
        let mut state = self.lock()?;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| auth_error(404, "User not found"))?;
        if account.is_confirmed {
            return Err(auth_error(400, "Email already confirmed"));
        }
        account.confirmation_token = Some(Uuid::new_v4().simple().to_string());
        Ok("Confirmation email sent successfully".into())
    }

    async fn change_password(&self, current_password: &str, new_password: &str) -> Result<String, DomainError> {
        let mut state = self.lock()?;
        let owner = self.caller(&state)?;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == owner)
            .ok_or_else(|| auth_error(401, "User not found"))?;
        if account.password != current_password {
            return Err(auth_error(401, "Current password is incorrect"));
        }
        account.password = new_password.to_string();
        Ok("Password changed successfully".into())
    }
}
