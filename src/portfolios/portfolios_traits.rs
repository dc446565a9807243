use async_trait::async_trait;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::portfolios_errors::Result as PortfolioResult;
use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioSummary, PortfolioUpdate};
use crate::errors::Result;

/// Trait defining the contract for portfolio repository operations.
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn create(&self, new_portfolio: NewPortfolio) -> PortfolioResult<Portfolio>;
    fn get_by_id(&self, portfolio_id: &str) -> PortfolioResult<Portfolio>;
    fn get_by_id_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> PortfolioResult<Portfolio>;
    fn list(&self) -> PortfolioResult<Vec<Portfolio>>;
    fn list_by_user(&self, user_id: &str) -> PortfolioResult<Vec<Portfolio>>;
    fn count_by_user(&self, user_id: &str) -> PortfolioResult<i64>;
    fn update(&self, portfolio_id: &str, update: PortfolioUpdate) -> PortfolioResult<Portfolio>;
    fn delete(&self, portfolio_id: &str) -> PortfolioResult<usize>;
    /// Sums (current_value, total_cost) over the portfolio's active positions.
    fn sum_active_positions_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> PortfolioResult<(Decimal, Decimal)>;
    fn count_active_positions_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> PortfolioResult<i64>;
    fn set_totals_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        total_value: Decimal,
        total_cost: Decimal,
    ) -> PortfolioResult<Portfolio>;
}

/// Narrow read-only lookup consumed by the position ledger engine. Kept
/// separate from the mutation surface so the engine and the aggregator do
/// not form a dependency cycle.
pub trait PortfolioLookupTrait: Send + Sync {
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;
    fn get_portfolio_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> Result<Portfolio>;
}

/// Trait defining the contract for portfolio service operations, including
/// the aggregate refresh that derives totals from active positions.
#[async_trait]
pub trait PortfolioServiceTrait: PortfolioLookupTrait {
    async fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;
    async fn update_portfolio(
        &self,
        portfolio_id: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio>;
    async fn delete_portfolio(&self, portfolio_id: &str) -> Result<()>;
    fn get_all_portfolios(&self) -> Result<Vec<Portfolio>>;
    fn get_portfolios_by_user(&self, user_id: &str) -> Result<Vec<Portfolio>>;
    fn get_portfolio_count_by_user(&self, user_id: &str) -> Result<i64>;
    fn get_portfolio_summary(&self, portfolio_id: &str) -> Result<PortfolioSummary>;
    fn update_portfolio_values(&self, portfolio_id: &str) -> Result<Portfolio>;
    fn update_portfolio_values_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> Result<Portfolio>;
}
