use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::calculator::CostBasis;
use super::positions_errors::{PositionError, Result};
use super::positions_model::{Position, PositionDB};
use super::positions_traits::PositionRepositoryTrait;
use crate::db::get_connection;
use crate::schema::positions::dsl::*;
use crate::schema::{positions, stocks};
use crate::utils::parse_decimal;

/// Repository for managing position rows in the database
pub struct PositionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PositionRepository {
    /// Creates a new PositionRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl PositionRepositoryTrait for PositionRepository {
    /// Retrieves a position by its ID
    fn get_by_id(&self, position_id: &str) -> Result<Position> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PositionError::DatabaseError(e.to_string()))?;

        positions
            .find(position_id)
            .first::<PositionDB>(&mut conn)
            .map(Position::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    PositionError::NotFound(format!("Position with id {} not found", position_id))
                }
                _ => PositionError::DatabaseError(e.to_string()),
            })
    }

    /// Retrieves the unique position for a (portfolio, stock) pair, if any
    fn get_by_pair_in(
        &self,
        conn: &mut SqliteConnection,
        for_portfolio_id: &str,
        for_stock_id: &str,
    ) -> Result<Option<Position>> {
        positions
            .filter(portfolio_id.eq(for_portfolio_id))
            .filter(stock_id.eq(for_stock_id))
            .first::<PositionDB>(conn)
            .optional()
            .map(|row| row.map(Position::from))
            .map_err(PositionError::from)
    }

    /// Inserts a fresh zero-quantity row for the pair
    fn insert_in(
        &self,
        conn: &mut SqliteConnection,
        for_portfolio_id: &str,
        for_stock_id: &str,
    ) -> Result<Position> {
        let position_db = PositionDB::new(for_portfolio_id, for_stock_id);

        diesel::insert_into(positions::table)
            .values(&position_db)
            .execute(conn)
            .map_err(PositionError::from)?;

        Ok(position_db.into())
    }

    /// Writes a recomputed cost basis and market value onto the row
    fn save_basis_in(
        &self,
        conn: &mut SqliteConnection,
        position_id: &str,
        basis: &CostBasis,
        new_current_value: Decimal,
    ) -> Result<Position> {
        let affected = diesel::update(positions.find(position_id))
            .set((
                quantity.eq(basis.quantity),
                average_cost.eq(basis.average_cost.to_string()),
                total_cost.eq(basis.total_cost.to_string()),
                current_value.eq(new_current_value.to_string()),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(PositionError::from)?;

        if affected == 0 {
            return Err(PositionError::NotFound(format!(
                "Position with id {} not found",
                position_id
            )));
        }

        positions
            .find(position_id)
            .first::<PositionDB>(conn)
            .map(Position::from)
            .map_err(PositionError::from)
    }

    /// Updates only the market value of a position
    fn set_current_value_in(
        &self,
        conn: &mut SqliteConnection,
        position_id: &str,
        new_current_value: Decimal,
    ) -> Result<()> {
        diesel::update(positions.find(position_id))
            .set((
                current_value.eq(new_current_value.to_string()),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(PositionError::from)?;

        Ok(())
    }

    /// Lists all positions of a portfolio, inert rows included
    fn list_by_portfolio(&self, for_portfolio_id: &str) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PositionError::DatabaseError(e.to_string()))?;

        positions
            .filter(portfolio_id.eq(for_portfolio_id))
            .order(created_at.asc())
            .load::<PositionDB>(&mut conn)
            .map(|results| results.into_iter().map(Position::from).collect())
            .map_err(PositionError::from)
    }

    /// Lists a portfolio's positions joined with their stock's current price
    fn list_with_prices_in(
        &self,
        conn: &mut SqliteConnection,
        for_portfolio_id: &str,
    ) -> Result<Vec<(Position, Decimal)>> {
        positions::table
            .inner_join(stocks::table)
            .filter(positions::portfolio_id.eq(for_portfolio_id))
            .select((PositionDB::as_select(), stocks::current_price))
            .load::<(PositionDB, String)>(conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(row, price)| {
                        (
                            Position::from(row),
                            parse_decimal(&price, "stock.current_price"),
                        )
                    })
                    .collect()
            })
            .map_err(PositionError::from)
    }

    /// Lists only active (quantity > 0) positions of a portfolio
    fn list_active_by_portfolio(&self, for_portfolio_id: &str) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PositionError::DatabaseError(e.to_string()))?;

        positions
            .filter(portfolio_id.eq(for_portfolio_id))
            .filter(quantity.gt(0))
            .order(created_at.asc())
            .load::<PositionDB>(&mut conn)
            .map(|results| results.into_iter().map(Position::from).collect())
            .map_err(PositionError::from)
    }

    /// Counts active positions of a portfolio
    fn count_active_by_portfolio(&self, for_portfolio_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PositionError::DatabaseError(e.to_string()))?;

        positions
            .filter(portfolio_id.eq(for_portfolio_id))
            .filter(quantity.gt(0))
            .count()
            .get_result(&mut conn)
            .map_err(PositionError::from)
    }
}
