mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{logged_in, trade_form};
use tradejournal::application::journal::{JournalForm, JournalUseCase};
use tradejournal::application::list_view::ListQuery;
use tradejournal::application::sequencer::RequestSequencer;
use tradejournal::domain::entities::journal_entry::{JournalEntry, JournalPage, JournalUpdate, NewJournalEntry};
use tradejournal::domain::error::DomainError;
use tradejournal::domain::ports::journal_api::{JournalApi, JournalFilter};
use tradejournal::domain::values::entry_type::EntryType;
use tradejournal::infrastructure::memory::backend::InMemoryJournalApi;

fn note(date: &str, notes: &str, trade_id: Option<&str>) -> JournalForm {
    JournalForm {
        date: Some(date.into()),
        notes: Some(notes.into()),
        trade_id: trade_id.map(String::from),
    }
}

#[tokio::test]
async fn test_entry_type_follows_trade_link() {
    let (tj, _) = logged_in().await;
    let trade = tj
        .trade_add(&trade_form("2026-03-02", "AMD", 10, 150.0, None, "Swing"))
        .await
        .unwrap();

    let general = tj.journal_add(&note("2026-03-02", "Slept badly", None)).await.unwrap();
    assert_eq!(general.entry_type, EntryType::General);

    let linked = tj
        .journal_add(&note("2026-03-02", "Bought the breakout", Some(&trade.id)))
        .await
        .unwrap();
    assert_eq!(linked.entry_type, EntryType::TradeSpecific);

    let unlinked = tj
        .journal_update(
            &linked.id,
            &JournalForm {
                trade_id: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(unlinked.entry_type, EntryType::General);
    assert!(unlinked.trade_id.is_none());
}

#[tokio::test]
async fn test_linking_unknown_trade_fails() {
    let (tj, _) = logged_in().await;
    let err = tj
        .journal_add(&note("2026-03-02", "Ghost trade", Some("nope")))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_blank_notes_are_blocked() {
    let (tj, _) = logged_in().await;
    let err = tj.journal_add(&note("2026-03-02", "   ", None)).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_server_side_paging_and_search() {
    let (tj, _) = logged_in().await;
    for day in 1..=12 {
        let text = if day % 3 == 0 { "Revenge trade again" } else { "Followed the plan" };
        tj.journal_add(&note(&format!("2026-04-{day:02}"), text, None)).await.unwrap();
    }

    let page = tj
        .journal(&ListQuery::from_query_string("page=2&per_page=5"))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.pagination.total, 12);
    assert_eq!(page.pagination.total_pages, 3);
    // Newest first: page 2 starts at the 7th newest entry.
    assert_eq!(page.items[0].date.to_string(), "2026-04-07");

    let revenge = tj
        .journal(&ListQuery::default().with_search(Some("revenge".into())))
        .await
        .unwrap();
    assert_eq!(revenge.pagination.total, 4);
}

#[tokio::test]
async fn test_deleting_trade_unlinks_its_notes() {
    let (tj, _) = logged_in().await;
    let trade = tj
        .trade_add(&trade_form("2026-03-02", "AMD", 10, 150.0, None, "Swing"))
        .await
        .unwrap();
    let entry = tj
        .journal_add(&note("2026-03-02", "Entry looked clean", Some(&trade.id)))
        .await
        .unwrap();
    assert_eq!(tj.journal_for_trade(&trade.id).await.unwrap().len(), 1);

    tj.trade_delete(&trade.id).await.unwrap();
    let entry = tj.journal_entry(&entry.id).await.unwrap();
    assert_eq!(entry.entry_type, EntryType::General);

    tj.journal_delete(&entry.id).await.unwrap();
    assert!(tj.journal_entry(&entry.id).await.is_err());
}

/// Holds back searches for "slow" so a later listing can overtake them.
struct LaggingJournal {
    inner: Arc<InMemoryJournalApi>,
}

#[async_trait]
impl JournalApi for LaggingJournal {
    async fn list_entries(&self, filter: &JournalFilter) -> Result<JournalPage, DomainError> {
        if filter.search.as_deref() == Some("slow") {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.inner.list_entries(filter).await
    }

    async fn get_entry(&self, id: &str) -> Result<JournalEntry, DomainError> {
        self.inner.get_entry(id).await
    }

    async fn create_entry(&self, entry: &NewJournalEntry) -> Result<JournalEntry, DomainError> {
        self.inner.create_entry(entry).await
    }

    async fn update_entry(&self, id: &str, update: &JournalUpdate) -> Result<JournalEntry, DomainError> {
        self.inner.update_entry(id, update).await
    }

    async fn delete_entry(&self, id: &str) -> Result<(), DomainError> {
        self.inner.delete_entry(id).await
    }
}

#[tokio::test]
async fn test_load_journal_returns_current_page() {
    let (tj, _) = logged_in().await;
    tj.journal_add(&note("2026-04-01", "Sized down after two losers", None))
        .await
        .unwrap();

    let page = tj.load_journal(&ListQuery::default()).await.unwrap().unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.items[0].notes, "Sized down after two losers");
}

#[tokio::test]
async fn test_overtaken_journal_load_is_dropped() {
    let (tj, backend) = logged_in().await;
    tj.journal_add(&note("2026-04-01", "slow tape all morning", None))
        .await
        .unwrap();
    tj.journal_add(&note("2026-04-02", "Took profits early", None))
        .await
        .unwrap();

    let journal = JournalUseCase::new(
        Arc::new(LaggingJournal { inner: backend }),
        Arc::new(RequestSequencer::new()),
    );
    let slow_query = ListQuery::default().with_search(Some("slow".into()));
    let latest_query = ListQuery::default();

    let (stale, latest) = tokio::join!(journal.load(&slow_query), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        journal.load(&latest_query).await
    });

    assert!(stale.is_none());
    let page = latest.unwrap().unwrap();
    assert_eq!(page.pagination.total, 2);
}
