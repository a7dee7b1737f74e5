use crate::domain::entities::journal_entry::{JournalEntry, JournalPage, JournalUpdate, NewJournalEntry};
use crate::domain::error::DomainError;
use crate::domain::values::entry_type::EntryType;
use async_trait::async_trait;
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalFilter {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub entry_type: Option<EntryType>,
    pub trade_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl JournalFilter {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(p) = self.page {
            params.push(("page", p.to_string()));
        }
        if let Some(p) = self.per_page {
            params.push(("per_page", p.to_string()));
        }
        if let Some(s) = self.search.as_ref().filter(|s| !s.is_empty()) {
            params.push(("search", s.clone()));
        }
        if let Some(t) = self.entry_type {
            params.push(("entry_type", t.to_string()));
        }
        if let Some(id) = self.trade_id.as_ref().filter(|s| !s.is_empty()) {
            params.push(("trade_id", id.clone()));
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

#[async_trait]
pub trait JournalApi: Send + Sync {
    async fn list_entries(&self, filter: &JournalFilter) -> Result<JournalPage, DomainError>;
    async fn get_entry(&self, id: &str) -> Result<JournalEntry, DomainError>;
    async fn create_entry(&self, entry: &NewJournalEntry) -> Result<JournalEntry, DomainError>;
    async fn update_entry(&self, id: &str, update: &JournalUpdate) -> Result<JournalEntry, DomainError>;
    async fn delete_entry(&self, id: &str) -> Result<(), DomainError>;
}
