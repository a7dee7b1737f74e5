use crate::domain::values::entry_type::EntryType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub date: NaiveDate,
    pub notes: String,
    #[serde(default)]
    pub trade_id: Option<String>,
    #[serde(default)]
    pub entry_type: EntryType,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewJournalEntry {
    pub date: NaiveDate,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<String>,
}

/// Partial update. `trade_id: Some(None)` unlinks the entry from its trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JournalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalPage {
    pub entries: Vec<JournalEntry>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}
