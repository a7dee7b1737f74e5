use crate::application::list_view::{filter_and_paginate, ListQuery, Page};
use crate::application::sequencer::{RequestCategory, RequestSequencer};
use crate::domain::entities::journal_entry::{JournalEntry, JournalUpdate, NewJournalEntry};
use crate::domain::error::{DomainError, FieldError};
use crate::domain::ports::journal_api::{JournalApi, JournalFilter};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalForm {
    pub date: Option<String>,
    pub notes: Option<String>,
    pub trade_id: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

impl JournalForm {
    pub fn validate(&self) -> Result<NewJournalEntry, DomainError> {
        let mut errors = Vec::new();
        let date = match trimmed(&self.date) {
            None => {
                errors.push(FieldError::new("date", "Date is required"));
                None
            }
            Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.push(FieldError::new("date", "Date must be YYYY-MM-DD"));
                    None
                }
            },
        };
        let notes = trimmed(&self.notes);
        if notes.is_none() {
            errors.push(FieldError::new("notes", "Notes are required"));
        }

        match (date, notes) {
            (Some(date), Some(notes)) if errors.is_empty() => Ok(NewJournalEntry {
                date,
                notes,
                trade_id: trimmed(&self.trade_id),
            }),
            _ => Err(DomainError::Validation(errors)),
        }
    }

    /// Partial update. An explicitly empty `trade_id` unlinks the entry.
    pub fn validate_update(&self) -> Result<JournalUpdate, DomainError> {
        let mut errors = Vec::new();
        let mut update = JournalUpdate::default();
        if let Some(raw) = self.date.as_deref() {
            match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(d) => update.date = Some(d),
                Err(_) => errors.push(FieldError::new("date", "Date must be YYYY-MM-DD")),
            }
        }
        if self.notes.is_some() {
            match trimmed(&self.notes) {
                Some(n) => update.notes = Some(n),
                None => errors.push(FieldError::new("notes", "Notes cannot be empty")),
            }
        }
        if self.trade_id.is_some() {
            update.trade_id = Some(trimmed(&self.trade_id));
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }
        if update == JournalUpdate::default() {
            return Err(DomainError::InvalidInput("Nothing to update".into()));
        }
        Ok(update)
    }
}

pub struct JournalUseCase {
    api: Arc<dyn JournalApi>,
    sequencer: Arc<RequestSequencer>,
}

impl JournalUseCase {
    pub fn new(api: Arc<dyn JournalApi>, sequencer: Arc<RequestSequencer>) -> Self {
        Self { api, sequencer }
    }

    pub async fn add(&self, form: &JournalForm) -> Result<JournalEntry, DomainError> {
        let entry = form.validate()?;
        let created = self.api.create_entry(&entry).await?;
        info!("created {} journal entry {}", created.entry_type, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: &str, form: &JournalForm) -> Result<JournalEntry, DomainError> {
        let update = form.validate_update()?;
        self.api.update_entry(id, &update).await
    }

    pub async fn get(&self, id: &str) -> Result<JournalEntry, DomainError> {
        self.api.get_entry(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.api.delete_entry(id).await?;
        info!("deleted journal entry {id}");
        Ok(())
    }

    /// Entries linked to one trade, newest first.
    pub async fn for_trade(&self, trade_id: &str) -> Result<Vec<JournalEntry>, DomainError> {
        let filter = JournalFilter {
            trade_id: Some(trade_id.to_string()),
            ..Default::default()
        };
        Ok(self.api.list_entries(&filter).await?.entries)
    }

    /// Server-side paging and search. If the backend answers without a
    /// `pagination` block it sent everything, so filter and page locally.
    pub async fn page(&self, query: &ListQuery) -> Result<Page<JournalEntry>, DomainError> {
        let page = self.api.list_entries(&query.journal_filter()?).await?;
        match page.pagination {
            Some(pagination) => Ok(Page {
                items: page.entries,
                pagination,
            }),
            None => {
                debug!("journal endpoint returned unpaged results, paging locally");
                Ok(filter_and_paginate(&page.entries, query))
            }
        }
    }

    pub async fn load(&self, query: &ListQuery) -> Option<Result<Page<JournalEntry>, DomainError>> {
        self.sequencer.run(RequestCategory::Journal, self.page(query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_entry_without_trade() {
        let entry = JournalForm {
            date: Some("2026-04-01".into()),
            notes: Some("  Chased the open again.  ".into()),
            trade_id: Some("   ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(entry.notes, "Chased the open again.");
        assert!(entry.trade_id.is_none());
    }

    #[test]
    fn blank_notes_rejected() {
        let err = JournalForm {
            date: Some("2026-04-01".into()),
            notes: Some("\n".into()),
            trade_id: None,
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref f) if f[0].field == "notes"));
    }

    #[test]
    fn empty_trade_id_unlinks_on_update() {
        let update = JournalForm {
            trade_id: Some(String::new()),
            ..Default::default()
        }
        .validate_update()
        .unwrap();
        assert_eq!(update.trade_id, Some(None));
    }
}
