mod common;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use investa_core::portfolios::{
    NewPortfolio, Portfolio, PortfolioLookupTrait, PortfolioServiceTrait,
};
use investa_core::positions::{PositionError, PositionServiceTrait};
use investa_core::stocks::{NewStock, Stock, StockServiceTrait};
use investa_core::transactions::{NewTransaction, TransactionServiceTrait, TransactionType};
use investa_core::Error;

use common::TestContext;

fn date(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").expect("valid test date")
}

async fn seed_portfolio_and_stock(ctx: &TestContext, price: Decimal) -> (Portfolio, Stock) {
    let portfolio = ctx
        .portfolios
        .create_portfolio(NewPortfolio {
            id: None,
            user_id: "user-1".to_string(),
            name: "Growth".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let stock = ctx
        .stocks
        .create_stock(NewStock {
            id: None,
            symbol: "AAPL".to_string(),
            company_name: "Apple Inc.".to_string(),
            sector: Some("Technology".to_string()),
            market_cap: None,
            current_price: price,
        })
        .await
        .unwrap();

    (portfolio, stock)
}

fn trade(
    portfolio: &Portfolio,
    stock: &Stock,
    transaction_type: TransactionType,
    quantity: i32,
    price: Decimal,
    fees: Decimal,
    transaction_date: &str,
) -> NewTransaction {
    NewTransaction {
        portfolio_id: portfolio.id.clone(),
        stock_id: stock.id.clone(),
        transaction_type,
        quantity,
        price_per_share: price,
        fees: Some(fees),
        transaction_date: Some(date(transaction_date)),
    }
}

#[tokio::test]
async fn buys_and_sells_flow_through_position_and_aggregates() {
    let ctx = TestContext::new("ledger-flow");
    let (portfolio, stock) = seed_portfolio_and_stock(&ctx, dec!(200.00)).await;

    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Buy,
            10,
            dec!(190.23),
            dec!(4.95),
            "2025-03-03 09:30:00",
        ))
        .await
        .unwrap();

    let position = ctx
        .positions
        .get_position_by_pair(&portfolio.id, &stock.id)
        .unwrap()
        .expect("position created by first buy");
    assert_eq!(position.quantity, 10);
    assert_eq!(position.average_cost, dec!(190.73));
    assert_eq!(position.total_cost, dec!(1907.25));
    assert_eq!(position.current_value, dec!(2000.00));

    let portfolio = ctx.portfolios.get_portfolio(&portfolio.id).unwrap();
    assert_eq!(portfolio.total_value, dec!(2000.00));
    assert_eq!(portfolio.total_cost, dec!(1907.25));

    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Sell,
            4,
            dec!(200.00),
            dec!(1.00),
            "2025-03-10 09:30:00",
        ))
        .await
        .unwrap();

    let position = ctx
        .positions
        .get_position_by_pair(&portfolio.id, &stock.id)
        .unwrap()
        .unwrap();
    assert_eq!(position.quantity, 6);
    assert_eq!(position.average_cost, dec!(190.73));
    assert_eq!(position.total_cost, dec!(1144.33));
    assert_eq!(position.current_value, dec!(1200.00));

    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Sell,
            6,
            dec!(210.00),
            dec!(0),
            "2025-03-17 09:30:00",
        ))
        .await
        .unwrap();

    // Full liquidation leaves an inert row that aggregates ignore.
    let position = ctx
        .positions
        .get_position_by_pair(&portfolio.id, &stock.id)
        .unwrap()
        .unwrap();
    assert_eq!(position.quantity, 0);
    assert_eq!(position.average_cost, Decimal::ZERO);
    assert_eq!(position.total_cost, Decimal::ZERO);
    assert!(!position.is_active());

    assert_eq!(
        ctx.positions
            .get_positions_by_portfolio(&portfolio.id)
            .unwrap()
            .len(),
        1
    );
    assert!(ctx
        .positions
        .get_active_positions(&portfolio.id)
        .unwrap()
        .is_empty());

    let portfolio = ctx.portfolios.get_portfolio(&portfolio.id).unwrap();
    assert_eq!(portfolio.total_value, Decimal::ZERO);
    assert_eq!(portfolio.total_cost, Decimal::ZERO);
}

#[tokio::test]
async fn oversell_rolls_back_the_ledger_write() {
    let ctx = TestContext::new("oversell");
    let (portfolio, stock) = seed_portfolio_and_stock(&ctx, dec!(100.00)).await;

    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Buy,
            5,
            dec!(100.00),
            dec!(0),
            "2025-04-01 10:00:00",
        ))
        .await
        .unwrap();

    let err = ctx
        .transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Sell,
            8,
            dec!(110.00),
            dec!(0),
            "2025-04-02 10:00:00",
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Position(PositionError::InsufficientShares {
            available: 5,
            requested: 8
        })
    ));

    // The rejected sell never reached the ledger and the position is intact.
    let ledger = ctx
        .transactions
        .get_transactions_by_portfolio(&portfolio.id)
        .unwrap();
    assert_eq!(ledger.len(), 1);

    let position = ctx
        .positions
        .get_position_by_pair(&portfolio.id, &stock.id)
        .unwrap()
        .unwrap();
    assert_eq!(position.quantity, 5);
    assert_eq!(position.total_cost, dec!(500.00));
}

#[tokio::test]
async fn deleting_a_transaction_replays_the_remaining_ledger() {
    let ctx = TestContext::new("delete-replay");
    let (portfolio, stock) = seed_portfolio_and_stock(&ctx, dec!(150.00)).await;

    let first_buy = ctx
        .transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Buy,
            10,
            dec!(100.00),
            dec!(0),
            "2025-05-01 10:00:00",
        ))
        .await
        .unwrap();
    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Buy,
            10,
            dec!(200.00),
            dec!(0),
            "2025-05-08 10:00:00",
        ))
        .await
        .unwrap();

    let blended = ctx
        .positions
        .get_position_by_pair(&portfolio.id, &stock.id)
        .unwrap()
        .unwrap();
    assert_eq!(blended.quantity, 20);
    assert_eq!(blended.average_cost, dec!(150.00));

    let position = ctx
        .transactions
        .delete_transaction(&first_buy.id)
        .await
        .unwrap();
    assert_eq!(position.quantity, 10);
    assert_eq!(position.average_cost, dec!(200.00));
    assert_eq!(position.total_cost, dec!(2000.00));

    let portfolio = ctx.portfolios.get_portfolio(&portfolio.id).unwrap();
    assert_eq!(portfolio.total_cost, dec!(2000.00));
    assert_eq!(portfolio.total_value, dec!(1500.00));
}

#[tokio::test]
async fn deleting_a_buy_that_strands_later_sells_is_rejected() {
    let ctx = TestContext::new("delete-stranded");
    let (portfolio, stock) = seed_portfolio_and_stock(&ctx, dec!(100.00)).await;

    let buy = ctx
        .transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Buy,
            5,
            dec!(100.00),
            dec!(0),
            "2025-06-02 10:00:00",
        ))
        .await
        .unwrap();
    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Sell,
            3,
            dec!(120.00),
            dec!(0),
            "2025-06-09 10:00:00",
        ))
        .await
        .unwrap();

    let err = ctx
        .transactions
        .delete_transaction(&buy.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Position(PositionError::InsufficientShares { .. })
    ));

    // Rolled back: both entries survive and the position is unchanged.
    assert_eq!(
        ctx.transactions
            .get_transactions_by_portfolio(&portfolio.id)
            .unwrap()
            .len(),
        2
    );
    let position = ctx
        .positions
        .get_position_by_pair(&portfolio.id, &stock.id)
        .unwrap()
        .unwrap();
    assert_eq!(position.quantity, 2);
}

#[tokio::test]
async fn updating_fees_rebuilds_the_cost_basis() {
    let ctx = TestContext::new("update-fees");
    let (portfolio, stock) = seed_portfolio_and_stock(&ctx, dec!(100.00)).await;

    let buy = ctx
        .transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Buy,
            10,
            dec!(100.00),
            dec!(0),
            "2025-07-01 10:00:00",
        ))
        .await
        .unwrap();

    let updated = ctx
        .transactions
        .update_transaction_fees(&buy.id, dec!(10.00))
        .await
        .unwrap();
    assert_eq!(updated.fees, dec!(10.00));

    let position = ctx
        .positions
        .get_position_by_pair(&portfolio.id, &stock.id)
        .unwrap()
        .unwrap();
    assert_eq!(position.total_cost, dec!(1010.00));
    assert_eq!(position.average_cost, dec!(101.00));

    let portfolio = ctx.portfolios.get_portfolio(&portfolio.id).unwrap();
    assert_eq!(portfolio.total_cost, dec!(1010.00));
}

#[tokio::test]
async fn refreshing_current_values_tracks_catalog_prices() {
    let ctx = TestContext::new("refresh-values");
    let (portfolio, stock) = seed_portfolio_and_stock(&ctx, dec!(100.00)).await;

    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Buy,
            10,
            dec!(100.00),
            dec!(0),
            "2025-08-01 10:00:00",
        ))
        .await
        .unwrap();

    ctx.stocks
        .update_stock_price(&stock.id, dec!(120.00))
        .await
        .unwrap();

    let refreshed = ctx
        .positions
        .refresh_current_values(&portfolio.id)
        .await
        .unwrap();
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].current_value, dec!(1200.00));

    let portfolio = ctx.portfolios.update_portfolio_values(&portfolio.id).unwrap();
    assert_eq!(portfolio.total_value, dec!(1200.00));
    assert_eq!(portfolio.total_cost, dec!(1000.00));
    assert_eq!(portfolio.gain_loss(), dec!(200.00));
    assert_eq!(portfolio.gain_loss_percentage(), dec!(20.00));
}

#[tokio::test]
async fn transaction_summary_folds_the_whole_ledger() {
    let ctx = TestContext::new("summary");
    let (portfolio, stock) = seed_portfolio_and_stock(&ctx, dec!(100.00)).await;

    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Buy,
            10,
            dec!(100.00),
            dec!(2.00),
            "2025-09-01 10:00:00",
        ))
        .await
        .unwrap();
    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Buy,
            5,
            dec!(110.00),
            dec!(1.00),
            "2025-09-05 10:00:00",
        ))
        .await
        .unwrap();
    ctx.transactions
        .record_transaction(trade(
            &portfolio,
            &stock,
            TransactionType::Sell,
            8,
            dec!(130.00),
            dec!(1.50),
            "2025-09-12 10:00:00",
        ))
        .await
        .unwrap();

    let summary = ctx
        .transactions
        .get_transaction_summary(&portfolio.id)
        .unwrap();
    assert_eq!(summary.total_transactions, 3);
    assert_eq!(summary.buy_transactions, 2);
    assert_eq!(summary.sell_transactions, 1);
    assert_eq!(summary.total_buy_amount, dec!(1550.00));
    assert_eq!(summary.total_sell_amount, dec!(1040.00));
    assert_eq!(summary.total_fees, dec!(4.50));
    assert_eq!(summary.net_invested, dec!(510.00));
}

#[tokio::test]
async fn recent_transactions_are_limited_and_newest_first() {
    let ctx = TestContext::new("recent-limit");
    let (portfolio, stock) = seed_portfolio_and_stock(&ctx, dec!(100.00)).await;

    for day in 1..=5 {
        ctx.transactions
            .record_transaction(trade(
                &portfolio,
                &stock,
                TransactionType::Buy,
                1,
                dec!(100.00),
                dec!(0),
                &format!("2025-11-0{} 10:00:00", day),
            ))
            .await
            .unwrap();
    }

    let recent = ctx
        .transactions
        .get_recent_transactions(&portfolio.id, 3)
        .unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].transaction_date, date("2025-11-05 10:00:00"));
    assert_eq!(recent[2].transaction_date, date("2025-11-03 10:00:00"));
}

#[tokio::test]
async fn recording_against_missing_parents_is_rejected() {
    let ctx = TestContext::new("missing-parents");
    let (portfolio, stock) = seed_portfolio_and_stock(&ctx, dec!(100.00)).await;

    let mut missing_stock = trade(
        &portfolio,
        &stock,
        TransactionType::Buy,
        1,
        dec!(100.00),
        dec!(0),
        "2025-10-01 10:00:00",
    );
    missing_stock.stock_id = "nope".to_string();
    let err = ctx
        .transactions
        .record_transaction(missing_stock)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    // The rejected entry never reached the ledger.
    assert!(ctx
        .transactions
        .get_transactions_by_portfolio(&portfolio.id)
        .unwrap()
        .is_empty());

    let mut missing_portfolio = trade(
        &portfolio,
        &stock,
        TransactionType::Buy,
        1,
        dec!(100.00),
        dec!(0),
        "2025-10-01 10:00:00",
    );
    missing_portfolio.portfolio_id = "nope".to_string();
    let err = ctx
        .transactions
        .record_transaction(missing_portfolio)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
