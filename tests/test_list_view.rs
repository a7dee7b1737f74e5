mod common;

use common::{logged_in, trade_form};
use tradejournal::application::list_view::{Listable, ListQuery, ListView};
use tradejournal::domain::entities::trade::Trade;

#[test]
fn test_url_state_round_trip() {
    let query = ListQuery::from_query_string("?page=3&per_page=25&search=nvda&type=Day");
    assert_eq!(query.page, 3);
    assert_eq!(query.per_page, 25);
    let raw = query.to_query_string();
    assert_eq!(ListQuery::from_query_string(&raw), query);

    // Changing a filter goes back to page one.
    let narrowed = query.with_search(Some("amd".into()));
    assert_eq!(narrowed.page, 1);
    assert_eq!(narrowed.per_page, 25);
}

#[tokio::test]
async fn test_delete_with_confirmation_updates_view() {
    let (tj, _) = logged_in().await;
    for (i, symbol) in ["AAA", "BBB", "CCC"].iter().enumerate() {
        tj.trade_add(&trade_form(&format!("2026-05-0{}", i + 1), symbol, 1, 10.0, None, "Swing"))
            .await
            .unwrap();
    }

    let query = ListQuery::default().with_per_page(2);
    let mut view: ListView<Trade> = ListView::new(query.clone());
    view.apply(tj.trades(&query).await);
    assert_eq!(view.items().len(), 2);
    assert_eq!(view.pagination().unwrap().total, 3);

    let key = view.items()[0].key();
    view.toggle_row(&key);
    assert!(view.is_expanded(&key));
    assert!(view.request_delete("not-on-screen").is_err());

    view.request_delete(&key).unwrap();
    view.cancel_delete();
    assert!(view.pending_delete().is_none());

    view.request_delete(&key).unwrap();
    let confirmed = view.confirm_delete().unwrap();
    tj.trade_delete(&confirmed).await.unwrap();
    view.remove(&confirmed);
    assert_eq!(view.items().len(), 1);
    assert_eq!(view.pagination().unwrap().total, 2);
    assert_eq!(view.pagination().unwrap().total_pages, 1);
    assert!(!view.is_expanded(&confirmed));
}

#[tokio::test]
async fn test_failed_load_keeps_rows_and_shows_error() {
    let (tj, _) = logged_in().await;
    tj.trade_add(&trade_form("2026-05-01", "AAA", 1, 10.0, None, "Swing"))
        .await
        .unwrap();

    let mut view: ListView<Trade> = ListView::new(ListQuery::default());
    let first = tj.trades(&ListQuery::default()).await;
    view.apply(first);
    assert!(view.error().is_none());

    let bad = ListQuery::from_query_string("type=Scalp");
    view.set_query(bad.clone());
    view.apply(tj.trades(&bad).await);
    assert!(view.error().is_some());
    assert_eq!(view.items().len(), 1);
}

#[test]
fn test_changing_query_drops_row_state() {
    let mut view: ListView<Trade> = ListView::new(ListQuery::default());
    view.toggle_all();
    assert!(view.is_expanded("anything"));
    view.set_query(ListQuery::default().with_search(Some("tsla".into())));
    assert!(!view.is_expanded("anything"));
}
