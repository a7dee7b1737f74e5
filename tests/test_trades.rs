mod common;

use common::{logged_in, setup, trade_form};
use tradejournal::application::list_view::ListQuery;
use tradejournal::application::trade::TradeForm;
use tradejournal::domain::error::DomainError;
use tradejournal::domain::values::trade_status::TradeStatus;
use tradejournal::domain::values::win_loss::WinLoss;

#[tokio::test]
async fn test_add_and_list_trade() {
    let (tj, _) = logged_in().await;
    let trade = tj
        .trade_add(&trade_form("2026-03-02", "aapl", 10, 150.0, None, "Swing"))
        .await
        .unwrap();

    assert_eq!(trade.ticker_symbol, "AAPL");
    assert_eq!(trade.status, TradeStatus::Open);
    assert_eq!(trade.shares_remaining, Some(10));

    let page = tj.trades(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.pagination.total, 1);
}

#[tokio::test]
async fn test_round_trip_trade_is_closed_with_result() {
    let (tj, _) = logged_in().await;
    let trade = tj
        .trade_add(&trade_form("2026-03-02", "MSFT", 5, 400.0, Some(390.0), "Day"))
        .await
        .unwrap();
    assert_eq!(trade.status, TradeStatus::Closed);
    assert_eq!(trade.win_loss, Some(WinLoss::Loss));
    assert_eq!(trade.realized_pnl(), Some(-50.0));
}

#[tokio::test]
async fn test_invalid_form_never_reaches_backend() {
    let (tj, _) = logged_in().await;
    let err = tj
        .trade_add(&trade_form("2026-03-02", "", -1, 0.0, None, "Position"))
        .await
        .unwrap_err();
    match err {
        DomainError::Validation(fields) => assert_eq!(fields.len(), 4),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(tj.trades(&ListQuery::default()).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_update_and_delete_trade() {
    let (tj, _) = logged_in().await;
    let trade = tj
        .trade_add(&trade_form("2026-03-02", "TSLA", 3, 200.0, None, "Swing"))
        .await
        .unwrap();

    let closed = tj
        .trade_update(
            &trade.id,
            &TradeForm {
                sell_price: Some(250.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(closed.status, TradeStatus::Closed);
    assert_eq!(closed.win_loss, Some(WinLoss::Win));

    tj.trade_delete(&trade.id).await.unwrap();
    let err = tj.trade(&trade.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Trade not found"));
}

#[tokio::test]
async fn test_requests_without_session_are_rejected() {
    let (tj, _) = setup();
    let err = tj.trades(&ListQuery::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.body().and_then(|b| b["message"].as_str()), Some("Token is missing"));
}

#[tokio::test]
async fn test_search_and_paging_happen_client_side() {
    let (tj, _) = logged_in().await;
    for (i, symbol) in ["NVDA", "AMD", "NVDL", "INTC", "NVDA"].iter().enumerate() {
        tj.trade_add(&trade_form(&format!("2026-01-0{}", i + 1), symbol, 1, 10.0, None, "Swing"))
            .await
            .unwrap();
    }

    let query = ListQuery::default().with_search(Some("nvd".into())).with_per_page(2);
    let first = tj.trades(&query).await.unwrap();
    assert_eq!(first.pagination.total, 3);
    assert_eq!(first.pagination.total_pages, 2);
    assert_eq!(first.items.len(), 2);

    let second = tj.trades(&query.clone().with_page(2)).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(!second.pagination.has_next());
}

#[tokio::test]
async fn test_trade_type_filter_goes_to_backend() {
    let (tj, _) = logged_in().await;
    tj.trade_add(&trade_form("2026-01-02", "SPY", 1, 500.0, Some(501.0), "Day"))
        .await
        .unwrap();
    tj.trade_add(&trade_form("2026-01-03", "QQQ", 1, 400.0, None, "Swing"))
        .await
        .unwrap();

    let query = ListQuery::from_query_string("type=Day");
    let page = tj.trades(&query).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].ticker_symbol, "SPY");

    let bad = ListQuery::from_query_string("type=Scalp");
    assert!(matches!(tj.trades(&bad).await, Err(DomainError::InvalidInput(_))));
}

#[tokio::test]
async fn test_sequenced_load_returns_latest() {
    let (tj, _) = logged_in().await;
    tj.trade_add(&trade_form("2026-01-02", "SPY", 1, 500.0, None, "Swing"))
        .await
        .unwrap();
    let loaded = tj.load_trades(&ListQuery::default()).await;
    assert_eq!(loaded.unwrap().unwrap().items.len(), 1);
}
