//! Filter, paging and row state shared by the trade, journal and position
//! lists. `ListQuery` is the view state that survives in a URL.

use crate::domain::entities::journal_entry::{JournalEntry, Pagination};
use crate::domain::entities::position::Position;
use crate::domain::entities::trade::Trade;
use crate::domain::error::DomainError;
use crate::domain::ports::journal_api::JournalFilter;
use crate::domain::ports::trade_api::{PositionFilter, TradeFilter};
use crate::domain::values::entry_type::EntryType;
use crate::domain::values::trade_status::TradeStatus;
use crate::domain::values::trading_type::TradingType;
use chrono::NaiveDate;
use log::warn;
use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    /// Trading type for trades, entry type for journal entries.
    pub kind: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            search: None,
            kind: None,
            status: None,
            date_from: None,
            date_to: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ListQuery {
    /// Serialize to a form-urlencoded query string. Defaults and empty
    /// filters are left out.
    pub fn to_query_string(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        if self.page != DEFAULT_PAGE {
            ser.append_pair("page", &self.page.to_string());
        }
        if self.per_page != DEFAULT_PER_PAGE {
            ser.append_pair("per_page", &self.per_page.to_string());
        }
        if let Some(s) = &self.search {
            ser.append_pair("search", s);
        }
        if let Some(k) = &self.kind {
            ser.append_pair("type", k);
        }
        if let Some(s) = &self.status {
            ser.append_pair("status", s);
        }
        if let Some(d) = self.date_from {
            ser.append_pair("date_from", &d.format("%Y-%m-%d").to_string());
        }
        if let Some(d) = self.date_to {
            ser.append_pair("date_to", &d.format("%Y-%m-%d").to_string());
        }
        ser.finish()
    }

    /// Rebuild view state from a query string (with or without the leading
    /// `?`). Malformed values fall back to defaults rather than failing.
    pub fn from_query_string(raw: &str) -> Self {
        let mut query = ListQuery::default();
        let raw = raw.trim().trim_start_matches('?');
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "page" => query.page = parse_positive(&value, DEFAULT_PAGE, "page"),
                "per_page" => {
                    query.per_page = parse_positive(&value, DEFAULT_PER_PAGE, "per_page").min(MAX_PER_PAGE)
                }
                "search" => query.search = non_empty(Some(value)),
                "type" => query.kind = non_empty(Some(value)),
                "status" => query.status = non_empty(Some(value)),
                "date_from" => query.date_from = parse_date_param(&value, "date_from"),
                "date_to" => query.date_to = parse_date_param(&value, "date_to"),
                other => warn!("ignoring unknown list parameter '{other}'"),
            }
        }
        query
    }

    /// New search term; goes back to the first page.
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = non_empty(search);
        self.page = DEFAULT_PAGE;
        self
    }

    pub fn with_kind(mut self, kind: Option<String>) -> Self {
        self.kind = non_empty(kind);
        self.page = DEFAULT_PAGE;
        self
    }

    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = non_empty(status);
        self.page = DEFAULT_PAGE;
        self
    }

    pub fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self.page = DEFAULT_PAGE;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self.page = DEFAULT_PAGE;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn trade_filter(&self) -> Result<TradeFilter, DomainError> {
        Ok(TradeFilter {
            trading_type: self.kind.as_deref().map(str::parse::<TradingType>).transpose()?,
            status: self.status.as_deref().map(str::parse::<TradeStatus>).transpose()?,
            date_from: self.date_from,
            date_to: self.date_to,
            ..Default::default()
        })
    }

    pub fn journal_filter(&self) -> Result<JournalFilter, DomainError> {
        Ok(JournalFilter {
            page: Some(self.page),
            per_page: Some(self.per_page),
            search: self.search.clone(),
            entry_type: self.kind.as_deref().map(str::parse::<EntryType>).transpose()?,
            trade_id: None,
            date_from: self.date_from,
            date_to: self.date_to,
        })
    }

    pub fn position_filter(&self) -> Result<PositionFilter, DomainError> {
        Ok(PositionFilter {
            status: self.status.as_deref().map(str::parse::<TradeStatus>).transpose()?,
            symbol: self.search.clone(),
        })
    }
}

fn parse_positive(value: &str, default: u32, name: &str) -> u32 {
    match value.trim().parse::<u32>() {
        Ok(n) if n >= 1 => n,
        _ => {
            warn!("invalid {name} '{value}', using {default}");
            default
        }
    }
}

fn parse_date_param(value: &str, name: &str) -> Option<NaiveDate> {
    if value.trim().is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            warn!("invalid {name} '{value}', ignoring");
            None
        }
    }
}

/// Something a list view can show: it has a stable row key and knows how to
/// answer the client-side filters.
pub trait Listable {
    fn key(&self) -> String;
    fn matches(&self, query: &ListQuery) -> bool;
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn in_range(date: NaiveDate, query: &ListQuery) -> bool {
    query.date_from.map_or(true, |from| date >= from) && query.date_to.map_or(true, |to| date <= to)
}

fn eq_ci(value: &str, wanted: Option<&String>) -> bool {
    wanted.map_or(true, |w| value.eq_ignore_ascii_case(w))
}

impl Listable for Trade {
    fn key(&self) -> String {
        self.id.clone()
    }

    fn matches(&self, query: &ListQuery) -> bool {
        query
            .search
            .as_ref()
            .map_or(true, |s| contains_ci(&self.ticker_symbol, s))
            && eq_ci(&self.trading_type.to_string(), query.kind.as_ref())
            && eq_ci(&self.status.to_string(), query.status.as_ref())
            && in_range(self.date, query)
    }
}

impl Listable for JournalEntry {
    fn key(&self) -> String {
        self.id.clone()
    }

    fn matches(&self, query: &ListQuery) -> bool {
        query.search.as_ref().map_or(true, |s| contains_ci(&self.notes, s))
            && eq_ci(&self.entry_type.to_string(), query.kind.as_ref())
            && in_range(self.date, query)
    }
}

impl Listable for Position {
    fn key(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.symbol.clone())
    }

    fn matches(&self, query: &ListQuery) -> bool {
        query.search.as_ref().map_or(true, |s| contains_ci(&self.symbol, s))
            && eq_ci(&self.status.to_string(), query.status.as_ref())
    }
}

/// One page of rows plus where it sits in the full result.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Client-side paging for endpoints that return everything at once.
pub fn paginate<T: Clone>(items: &[T], page: u32, per_page: u32) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len() as u64;
    let total_pages = total.div_ceil(per_page as u64) as u32;
    let page = page.max(1);
    let start = ((page - 1) as usize).saturating_mul(per_page as usize);
    let items = items
        .iter()
        .skip(start)
        .take(per_page as usize)
        .cloned()
        .collect();
    Page {
        items,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }
}

/// Apply a query's client-side filters and then page the result.
pub fn filter_and_paginate<T: Listable + Clone>(items: &[T], query: &ListQuery) -> Page<T> {
    let filtered: Vec<T> = items.iter().filter(|i| i.matches(query)).cloned().collect();
    paginate(&filtered, query.page, query.per_page)
}

/// Row-level UI state over the most recent page: which rows are expanded,
/// which delete is awaiting confirmation, and the inline error if the last
/// load failed.
#[derive(Debug, Clone, Serialize)]
pub struct ListView<T> {
    #[serde(skip)]
    query: ListQuery,
    items: Vec<T>,
    pagination: Option<Pagination>,
    error: Option<String>,
    #[serde(skip)]
    expanded: HashSet<String>,
    #[serde(skip)]
    expand_all: bool,
    #[serde(skip)]
    pending_delete: Option<String>,
}

impl<T: Listable + Clone> ListView<T> {
    pub fn new(query: ListQuery) -> Self {
        Self {
            query,
            items: Vec::new(),
            pagination: None,
            error: None,
            expanded: HashSet::new(),
            expand_all: false,
            pending_delete: None,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Switch to a new query. Expansion and any pending delete belong to the
    /// old rows and are dropped.
    pub fn set_query(&mut self, query: ListQuery) {
        if query != self.query {
            self.expanded.clear();
            self.expand_all = false;
            self.pending_delete = None;
        }
        self.query = query;
    }

    pub fn apply(&mut self, outcome: Result<Page<T>, DomainError>) {
        match outcome {
            Ok(page) => {
                self.items = page.items;
                self.pagination = Some(page.pagination);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn toggle_row(&mut self, key: &str) {
        if !self.expanded.remove(key) {
            self.expanded.insert(key.to_string());
        }
    }

    pub fn toggle_all(&mut self) {
        self.expand_all = !self.expand_all;
        if !self.expand_all {
            self.expanded.clear();
        }
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expand_all || self.expanded.contains(key)
    }

    /// First half of delete-with-confirmation. The row has to be on screen.
    pub fn request_delete(&mut self, key: &str) -> Result<(), DomainError> {
        if !self.items.iter().any(|i| i.key() == key) {
            return Err(DomainError::NotFound(format!("No row {key} in the current view")));
        }
        self.pending_delete = Some(key.to_string());
        Ok(())
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Hand back the key the user confirmed; the caller performs the delete
    /// and then calls `remove`.
    pub fn confirm_delete(&mut self) -> Option<String> {
        self.pending_delete.take()
    }

    pub fn remove(&mut self, key: &str) {
        let before = self.items.len();
        self.items.retain(|i| i.key() != key);
        self.expanded.remove(key);
        if let Some(p) = self.pagination.as_mut() {
            if self.items.len() < before {
                p.total = p.total.saturating_sub(1);
                p.total_pages = p.total.div_ceil(p.per_page.max(1) as u64) as u32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_round_trip_preserves_paging() {
        let query = ListQuery::from_query_string("page=3&per_page=25");
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 25);
        assert_eq!(query.to_query_string(), "page=3&per_page=25");
        assert_eq!(ListQuery::from_query_string(&query.to_query_string()), query);
    }

    #[test]
    fn url_round_trip_with_filters() {
        let query = ListQuery::default()
            .with_search(Some("fomo & greed".into()))
            .with_kind(Some("trade_specific".into()))
            .with_dates("2026-01-01".parse().ok(), "2026-03-31".parse().ok())
            .with_page(2);
        let restored = ListQuery::from_query_string(&format!("?{}", query.to_query_string()));
        assert_eq!(restored, query);
    }

    #[test]
    fn malformed_params_fall_back() {
        let query = ListQuery::from_query_string("page=zero&per_page=-4&date_from=yesterday");
        assert_eq!(query.page, DEFAULT_PAGE);
        assert_eq!(query.per_page, DEFAULT_PER_PAGE);
        assert_eq!(query.date_from, None);
    }

    #[test]
    fn changing_filters_resets_page() {
        let query = ListQuery::default().with_page(4).with_status(Some("OPEN".into()));
        assert_eq!(query.page, 1);
    }

    #[test]
    fn paginate_reports_totals() {
        let rows: Vec<u32> = (1..=23).collect();
        let page = paginate(&rows, 3, 10);
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.pagination.total, 23);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(!page.pagination.has_next());

        let past_end = paginate(&rows, 9, 10);
        assert!(past_end.items.is_empty());
    }
}
