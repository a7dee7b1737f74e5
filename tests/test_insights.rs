mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{logged_in, EMAIL};
use tradejournal::application::insights::PanelState;
use tradejournal::application::journal::JournalForm;
use tradejournal::domain::error::DomainError;
use tradejournal::domain::values::plan_tier::PlanTier;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

fn note(text: &str) -> JournalForm {
    JournalForm {
        date: Some("2026-05-30".into()),
        notes: Some(text.into()),
        trade_id: None,
    }
}

#[tokio::test]
async fn test_nothing_stored_yet_allows_refresh() {
    let (tj, backend) = logged_in().await;
    backend.set_clock(t0()).unwrap();

    let panel = tj.insights(t0()).await.unwrap();
    assert_eq!(panel.state, PanelState::NoStoredInsights);
    assert!(panel.insights.is_none());
    assert!(panel.eligibility.can_refresh);
    assert_eq!(panel.plan.unwrap().plan, PlanTier::Free);
}

#[tokio::test]
async fn test_refresh_starts_cooldown() {
    let (tj, backend) = logged_in().await;
    backend.set_clock(t0()).unwrap();
    tj.journal_add(&note("Chased the open again")).await.unwrap();

    let panel = tj.insights_refresh(t0()).await.unwrap();
    assert_eq!(panel.state, PanelState::Shown { refresh_enabled: false });
    assert!(panel.cooldown_active());
    assert_eq!(panel.eligibility.days_until_next, 30);
    assert!(!panel.insights.unwrap().key_patterns.is_empty());

    let err = tj.insights_refresh(t0() + Duration::days(1)).await.unwrap_err();
    match err {
        DomainError::InvalidInput(msg) => assert_eq!(msg, "New insights available in 29 days"),
        other => panic!("expected cooldown error, got {other:?}"),
    }

    // The cached plan still says no until the backend is asked again.
    let later = t0() + Duration::days(31);
    assert!(!tj.insights_eligibility(later).unwrap().can_refresh);
    backend.set_clock(later).unwrap();
    let panel = tj.insights_refresh(later).await.unwrap();
    assert!(panel.cooldown_active());
}

#[tokio::test]
async fn test_refusal_without_pending_window_is_neutral() {
    let (tj, backend) = logged_in().await;
    backend.set_clock(t0()).unwrap();
    tj.journal_add(&note("Faded the gap")).await.unwrap();
    tj.insights_refresh(t0()).await.unwrap();

    // The backend still refuses even though its window date has passed.
    let err = tj.insights_refresh(t0() + Duration::days(31)).await.unwrap_err();
    match err {
        DomainError::InvalidInput(msg) => assert_eq!(msg, "Insights are not available yet"),
        other => panic!("expected refusal, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pro_plan_cooldown_is_one_day() {
    let (tj, backend) = logged_in().await;
    backend.set_clock(t0()).unwrap();
    backend.set_plan(EMAIL, PlanTier::Pro).unwrap();
    tj.journal_add(&note("Sized down after two losses")).await.unwrap();

    let panel = tj.insights_refresh(t0()).await.unwrap();
    assert_eq!(panel.eligibility.days_until_next, 1);
    assert_eq!(panel.plan.unwrap().plan, PlanTier::Pro);
}

#[tokio::test]
async fn test_refresh_without_entries_returns_message() {
    let (tj, backend) = logged_in().await;
    backend.set_clock(t0()).unwrap();

    let panel = tj.insights_refresh(t0()).await.unwrap();
    let insights = panel.insights.unwrap();
    assert_eq!(insights.summary.as_deref(), Some("No journal entries found to analyze."));
    // Nothing was stored, so the window stays open.
    assert!(panel.eligibility.can_refresh);
}

#[tokio::test]
async fn test_insights_require_login() {
    let (tj, _) = common::setup();
    let panel = tj.insights(t0()).await.unwrap();
    assert!(matches!(panel.state, PanelState::Failed { .. }));
    assert!(!panel.eligibility.can_refresh);
}
