use async_trait::async_trait;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::calculator;
use super::positions_model::Position;
use super::positions_traits::{PositionRepositoryTrait, PositionServiceTrait};
use crate::db::get_connection;
use crate::errors::Result;
use crate::portfolios::PortfolioLookupTrait;
use crate::stocks::StockServiceTrait;
use crate::transactions::{Transaction, TransactionRepositoryTrait};

/// The position ledger engine: maintains the unique position per
/// (portfolio, stock) pair, either incrementally per transaction or by
/// replaying the pair's full ledger.
pub struct PositionService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    repository: Arc<dyn PositionRepositoryTrait>,
    portfolio_lookup: Arc<dyn PortfolioLookupTrait>,
    stock_service: Arc<dyn StockServiceTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl PositionService {
    /// Creates a new PositionService instance with injected dependencies
    pub fn new(
        pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
        repository: Arc<dyn PositionRepositoryTrait>,
        portfolio_lookup: Arc<dyn PortfolioLookupTrait>,
        stock_service: Arc<dyn StockServiceTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            pool,
            repository,
            portfolio_lookup,
            stock_service,
            transaction_repository,
        }
    }

    /// Returns the pair's position, creating a zero row lazily on first use.
    /// Both parents must exist.
    fn get_or_create_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<Position> {
        self.portfolio_lookup.get_portfolio_in(conn, portfolio_id)?;
        self.stock_service.get_stock_in(conn, stock_id)?;

        if let Some(position) = self
            .repository
            .get_by_pair_in(conn, portfolio_id, stock_id)?
        {
            return Ok(position);
        }

        debug!(
            "Creating position for portfolio {} / stock {}",
            portfolio_id, stock_id
        );
        Ok(self.repository.insert_in(conn, portfolio_id, stock_id)?)
    }
}

#[async_trait]
impl PositionServiceTrait for PositionService {
    fn get_position(&self, position_id: &str) -> Result<Position> {
        Ok(self.repository.get_by_id(position_id)?)
    }

    fn get_position_by_pair(
        &self,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<Option<Position>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(self
            .repository
            .get_by_pair_in(&mut conn, portfolio_id, stock_id)?)
    }

    async fn get_or_create_position(
        &self,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<Position> {
        let mut conn = get_connection(&self.pool)?;
        self.get_or_create_in(&mut conn, portfolio_id, stock_id)
    }

    fn get_positions_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Position>> {
        Ok(self.repository.list_by_portfolio(portfolio_id)?)
    }

    fn get_active_positions(&self, portfolio_id: &str) -> Result<Vec<Position>> {
        Ok(self.repository.list_active_by_portfolio(portfolio_id)?)
    }

    fn count_active_positions(&self, portfolio_id: &str) -> Result<i64> {
        Ok(self.repository.count_active_by_portfolio(portfolio_id)?)
    }

    /// Active positions ranked by market value, largest first
    fn get_top_positions(&self, portfolio_id: &str, limit: usize) -> Result<Vec<Position>> {
        let mut active = self.repository.list_active_by_portfolio(portfolio_id)?;
        active.sort_by(|a, b| b.current_value.cmp(&a.current_value));
        active.truncate(limit);
        Ok(active)
    }

    fn apply_transaction_in(
        &self,
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> Result<Position> {
        let position =
            self.get_or_create_in(conn, &transaction.portfolio_id, &transaction.stock_id)?;

        let basis = calculator::apply(&position.cost_basis(), transaction)?;

        // Market value uses the catalog's current price, not the trade price.
        let stock = self.stock_service.get_stock_in(conn, &transaction.stock_id)?;
        let current_value = Decimal::from(basis.quantity) * stock.current_price;

        Ok(self
            .repository
            .save_basis_in(conn, &position.id, &basis, current_value)?)
    }

    fn recalculate_position_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<Position> {
        let position = self.get_or_create_in(conn, portfolio_id, stock_id)?;

        let history = self
            .transaction_repository
            .list_for_pair_in(conn, portfolio_id, stock_id)?;
        let basis = calculator::replay(history.iter())?;

        debug!(
            "Recalculated position {} from {} transactions: qty={}, avg={}",
            position.id,
            history.len(),
            basis.quantity,
            basis.average_cost
        );

        let stock = self.stock_service.get_stock_in(conn, stock_id)?;
        let current_value = Decimal::from(basis.quantity) * stock.current_price;

        Ok(self
            .repository
            .save_basis_in(conn, &position.id, &basis, current_value)?)
    }

    async fn refresh_current_values(&self, portfolio_id: &str) -> Result<Vec<Position>> {
        self.portfolio_lookup.get_portfolio(portfolio_id)?;

        let mut conn = get_connection(&self.pool)?;
        let priced = self
            .repository
            .list_with_prices_in(&mut conn, portfolio_id)?;

        let mut refreshed = Vec::with_capacity(priced.len());
        for (mut position, price) in priced {
            let current_value = Decimal::from(position.quantity) * price;
            self.repository
                .set_current_value_in(&mut conn, &position.id, current_value)?;
            position.current_value = current_value;
            refreshed.push(position);
        }

        Ok(refreshed)
    }
}
