use async_trait::async_trait;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::calculator::CostBasis;
use super::positions_errors::Result as PositionResult;
use super::positions_model::Position;
use crate::errors::Result;
use crate::transactions::Transaction;

/// Trait defining the contract for position repository operations.
pub trait PositionRepositoryTrait: Send + Sync {
    fn get_by_id(&self, position_id: &str) -> PositionResult<Position>;
    fn get_by_pair_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        stock_id: &str,
    ) -> PositionResult<Option<Position>>;
    fn insert_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        stock_id: &str,
    ) -> PositionResult<Position>;
    fn save_basis_in(
        &self,
        conn: &mut SqliteConnection,
        position_id: &str,
        basis: &CostBasis,
        current_value: Decimal,
    ) -> PositionResult<Position>;
    fn set_current_value_in(
        &self,
        conn: &mut SqliteConnection,
        position_id: &str,
        current_value: Decimal,
    ) -> PositionResult<()>;
    fn list_by_portfolio(&self, portfolio_id: &str) -> PositionResult<Vec<Position>>;
    /// Positions joined with their stock's latest catalog price.
    fn list_with_prices_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> PositionResult<Vec<(Position, Decimal)>>;
    fn list_active_by_portfolio(&self, portfolio_id: &str) -> PositionResult<Vec<Position>>;
    fn count_active_by_portfolio(&self, portfolio_id: &str) -> PositionResult<i64>;
}

/// Trait defining the contract for the position ledger engine.
#[async_trait]
pub trait PositionServiceTrait: Send + Sync {
    fn get_position(&self, position_id: &str) -> Result<Position>;
    fn get_position_by_pair(
        &self,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<Option<Position>>;
    async fn get_or_create_position(
        &self,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<Position>;
    fn get_positions_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Position>>;
    fn get_active_positions(&self, portfolio_id: &str) -> Result<Vec<Position>>;
    fn count_active_positions(&self, portfolio_id: &str) -> Result<i64>;
    fn get_top_positions(&self, portfolio_id: &str, limit: usize) -> Result<Vec<Position>>;
    /// Incremental path: folds one recorded transaction into the pair's
    /// position. Runs inside the caller's unit of work.
    fn apply_transaction_in(
        &self,
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> Result<Position>;
    /// Full-rebuild path: replays the pair's whole ledger in chronological
    /// order (transaction date, then id). Runs inside the caller's unit of
    /// work; used after deletions and fee changes.
    fn recalculate_position_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<Position>;
    /// Re-derives currentValue for every position of the portfolio from the
    /// latest stock prices without touching quantity or cost.
    async fn refresh_current_values(&self, portfolio_id: &str) -> Result<Vec<Position>>;
}
