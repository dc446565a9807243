use async_trait::async_trait;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioSummary, PortfolioUpdate};
use super::portfolios_repository::PortfolioRepository;
use super::portfolios_traits::{
    PortfolioLookupTrait, PortfolioRepositoryTrait, PortfolioServiceTrait,
};
use crate::db::get_connection;
use crate::errors::Result;

/// Service for managing portfolios and their derived aggregates. The stored
/// totals are a cache over active positions, refreshed after every ledger
/// mutation rather than trusted as source of truth.
pub struct PortfolioService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    repository: Arc<dyn PortfolioRepositoryTrait>,
}

impl PortfolioService {
    /// Creates a new PortfolioService instance backed by the given pool
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        let repository = Arc::new(PortfolioRepository::new(pool.clone()));
        Self { pool, repository }
    }
}

impl PortfolioLookupTrait for PortfolioService {
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        Ok(self.repository.get_by_id(portfolio_id)?)
    }

    fn get_portfolio_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> Result<Portfolio> {
        Ok(self.repository.get_by_id_in(conn, portfolio_id)?)
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        Ok(self.repository.create(new_portfolio)?)
    }

    async fn update_portfolio(
        &self,
        portfolio_id: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio> {
        Ok(self.repository.update(portfolio_id, update)?)
    }

    async fn delete_portfolio(&self, portfolio_id: &str) -> Result<()> {
        self.repository.delete(portfolio_id)?;
        Ok(())
    }

    fn get_all_portfolios(&self) -> Result<Vec<Portfolio>> {
        Ok(self.repository.list()?)
    }

    fn get_portfolios_by_user(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        Ok(self.repository.list_by_user(user_id)?)
    }

    fn get_portfolio_count_by_user(&self, user_id: &str) -> Result<i64> {
        Ok(self.repository.count_by_user(user_id)?)
    }

    /// Returns the portfolio together with its active position count and
    /// gain/loss figures
    fn get_portfolio_summary(&self, portfolio_id: &str) -> Result<PortfolioSummary> {
        let portfolio = self.get_portfolio(portfolio_id)?;
        let mut conn = get_connection(&self.pool)?;
        let position_count = self
            .repository
            .count_active_positions_in(&mut conn, portfolio_id)?;

        Ok(PortfolioSummary {
            gain_loss: portfolio.gain_loss(),
            gain_loss_percentage: portfolio.gain_loss_percentage(),
            position_count,
            portfolio,
        })
    }

    /// Re-derives totalValue/totalCost from the portfolio's active positions
    fn update_portfolio_values(&self, portfolio_id: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;
        self.update_portfolio_values_in(&mut conn, portfolio_id)
    }

    fn update_portfolio_values_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> Result<Portfolio> {
        let (total_value, total_cost) = self
            .repository
            .sum_active_positions_in(conn, portfolio_id)?;

        debug!(
            "Refreshing portfolio {} aggregates: value={}, cost={}",
            portfolio_id, total_value, total_cost
        );

        Ok(self
            .repository
            .set_totals_in(conn, portfolio_id, total_value, total_cost)?)
    }
}
