mod common;

use rust_decimal_macros::dec;

use investa_core::portfolios::{NewPortfolio, PortfolioServiceTrait};
use investa_core::positions::PositionServiceTrait;
use investa_core::stocks::{NewStock, StockError, StockServiceTrait};
use investa_core::transactions::{NewTransaction, TransactionServiceTrait, TransactionType};
use investa_core::Error;

use common::TestContext;

fn new_stock(symbol: &str, company: &str, sector: Option<&str>, price: &str) -> NewStock {
    NewStock {
        id: None,
        symbol: symbol.to_string(),
        company_name: company.to_string(),
        sector: sector.map(str::to_string),
        market_cap: None,
        current_price: price.parse().expect("valid test price"),
    }
}

#[tokio::test]
async fn symbols_are_normalized_and_unique() {
    let ctx = TestContext::new("catalog-unique");

    let stock = ctx
        .stocks
        .create_stock(new_stock("aapl", "Apple Inc.", Some("Technology"), "190.23"))
        .await
        .unwrap();
    assert_eq!(stock.symbol, "AAPL");

    let err = ctx
        .stocks
        .create_stock(new_stock("AAPL", "Apple again", None, "1.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Stock(StockError::AlreadyExists(_))));

    let by_symbol = ctx.stocks.get_stock_by_symbol("AAPL").unwrap();
    assert_eq!(by_symbol.id, stock.id);
}

#[tokio::test]
async fn get_or_create_reuses_the_row_and_refreshes_the_price() {
    let ctx = TestContext::new("catalog-get-or-create");

    let created = ctx
        .stocks
        .get_or_create_stock("MSFT", "Microsoft Corporation", Some(dec!(410.00)))
        .await
        .unwrap();
    assert_eq!(created.symbol, "MSFT");
    assert_eq!(created.current_price, dec!(410.00));

    let reused = ctx
        .stocks
        .get_or_create_stock("MSFT", "ignored", Some(dec!(415.50)))
        .await
        .unwrap();
    assert_eq!(reused.id, created.id);
    assert_eq!(reused.company_name, "Microsoft Corporation");
    assert_eq!(reused.current_price, dec!(415.50));

    // Without a price the existing row is returned untouched.
    let untouched = ctx
        .stocks
        .get_or_create_stock("MSFT", "ignored", None)
        .await
        .unwrap();
    assert_eq!(untouched.current_price, dec!(415.50));
}

#[tokio::test]
async fn search_and_sector_listings() {
    let ctx = TestContext::new("catalog-search");

    ctx.stocks
        .create_stock(new_stock("AAPL", "Apple Inc.", Some("Technology"), "190.23"))
        .await
        .unwrap();
    ctx.stocks
        .create_stock(new_stock("MSFT", "Microsoft Corporation", Some("Technology"), "410.00"))
        .await
        .unwrap();
    ctx.stocks
        .create_stock(new_stock("JPM", "JPMorgan Chase", Some("Financials"), "200.00"))
        .await
        .unwrap();

    let hits = ctx.stocks.search_stocks("micro").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].symbol, "MSFT");

    let tech = ctx.stocks.get_stocks_by_sector("Technology").unwrap();
    assert_eq!(tech.len(), 2);

    let sectors = ctx.stocks.get_all_sectors().unwrap();
    assert_eq!(sectors, vec!["Financials".to_string(), "Technology".to_string()]);
}

#[tokio::test]
async fn portfolio_summary_counts_only_active_positions() {
    let ctx = TestContext::new("portfolio-summary");

    let portfolio = ctx
        .portfolios
        .create_portfolio(NewPortfolio {
            id: None,
            user_id: "user-1".to_string(),
            name: "Core".to_string(),
            description: Some("Long-term holdings".to_string()),
        })
        .await
        .unwrap();
    let aapl = ctx
        .stocks
        .create_stock(new_stock("AAPL", "Apple Inc.", Some("Technology"), "200.00"))
        .await
        .unwrap();
    let msft = ctx
        .stocks
        .create_stock(new_stock("MSFT", "Microsoft Corporation", Some("Technology"), "400.00"))
        .await
        .unwrap();

    for (stock_id, quantity, price) in [
        (aapl.id.clone(), 10, dec!(180.00)),
        (msft.id.clone(), 2, dec!(390.00)),
    ] {
        ctx.transactions
            .record_transaction(NewTransaction {
                portfolio_id: portfolio.id.clone(),
                stock_id,
                transaction_type: TransactionType::Buy,
                quantity,
                price_per_share: price,
                fees: None,
                transaction_date: None,
            })
            .await
            .unwrap();
    }

    // Liquidate MSFT so only AAPL stays active.
    ctx.transactions
        .record_transaction(NewTransaction {
            portfolio_id: portfolio.id.clone(),
            stock_id: msft.id.clone(),
            transaction_type: TransactionType::Sell,
            quantity: 2,
            price_per_share: dec!(400.00),
            fees: None,
            transaction_date: None,
        })
        .await
        .unwrap();

    let summary = ctx.portfolios.get_portfolio_summary(&portfolio.id).unwrap();
    assert_eq!(summary.position_count, 1);
    assert_eq!(summary.portfolio.total_value, dec!(2000.00));
    assert_eq!(summary.portfolio.total_cost, dec!(1800.00));
    assert_eq!(summary.gain_loss, dec!(200.00));
    // 200 / 1800 = 0.1111..., rounded to 4 decimals then scaled
    assert_eq!(summary.gain_loss_percentage, dec!(11.11));

    let top = ctx.positions.get_top_positions(&portfolio.id, 5).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].stock_id, aapl.id);
}

#[tokio::test]
async fn portfolios_are_scoped_per_user() {
    let ctx = TestContext::new("portfolio-users");

    for (user, name) in [("user-1", "Growth"), ("user-1", "Income"), ("user-2", "Solo")] {
        ctx.portfolios
            .create_portfolio(NewPortfolio {
                id: None,
                user_id: user.to_string(),
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap();
    }

    assert_eq!(ctx.portfolios.get_portfolios_by_user("user-1").unwrap().len(), 2);
    assert_eq!(ctx.portfolios.get_portfolio_count_by_user("user-2").unwrap(), 1);
    assert_eq!(ctx.portfolios.get_all_portfolios().unwrap().len(), 3);
}
