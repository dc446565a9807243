use std::sync::Arc;

use chrono::Local;

use investa_core::db;
use investa_core::portfolios::PortfolioService;
use investa_core::positions::{PositionRepository, PositionService};
use investa_core::stocks::StockService;
use investa_core::transactions::{TransactionRepository, TransactionService};

/// A fully wired service graph over a throwaway on-disk database.
pub struct TestContext {
    pub stocks: Arc<StockService>,
    pub portfolios: Arc<PortfolioService>,
    pub positions: Arc<PositionService>,
    pub transactions: TransactionService,
    db_dir: String,
}

impl TestContext {
    pub fn new(test_id: &str) -> Self {
        let now = Local::now();
        let db_dir = now
            .format(&format!("./tests/output/%Y%m%d/%H%M%S%f-{}/", test_id))
            .to_string();

        let db_path = db::init(&db_dir).expect("Failed to initialize database");
        let pool = db::create_pool(&db_path).expect("Failed to create database pool");
        db::run_migrations(&pool).expect("Failed to run migrations");

        let stocks = Arc::new(StockService::new(pool.clone()));
        let portfolios = Arc::new(PortfolioService::new(pool.clone()));
        let position_repository = Arc::new(PositionRepository::new(pool.clone()));
        let transaction_repository = Arc::new(TransactionRepository::new(pool.clone()));
        let positions = Arc::new(PositionService::new(
            pool.clone(),
            position_repository,
            portfolios.clone(),
            stocks.clone(),
            transaction_repository.clone(),
        ));
        let transactions = TransactionService::new(
            pool.clone(),
            transaction_repository,
            positions.clone(),
            portfolios.clone(),
            stocks.clone(),
        );

        Self {
            stocks,
            portfolios,
            positions,
            transactions,
            db_dir,
        }
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.db_dir);
    }
}
