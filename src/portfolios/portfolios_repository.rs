use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::portfolios_errors::{PortfolioError, Result};
use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioDB, PortfolioUpdate};
use super::portfolios_traits::PortfolioRepositoryTrait;
use crate::db::get_connection;
use crate::schema::portfolios::dsl::*;
use crate::schema::{portfolios, positions};
use crate::utils::parse_decimal;

/// Repository for managing portfolio data in the database
pub struct PortfolioRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PortfolioRepository {
    /// Creates a new PortfolioRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl PortfolioRepositoryTrait for PortfolioRepository {
    /// Creates a new portfolio with zeroed aggregates
    fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        new_portfolio.validate()?;

        let portfolio_db: PortfolioDB = new_portfolio.into();

        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        diesel::insert_into(portfolios::table)
            .values(&portfolio_db)
            .execute(&mut conn)
            .map_err(PortfolioError::from)?;

        Ok(portfolio_db.into())
    }

    /// Retrieves a portfolio by its ID
    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;
        self.get_by_id_in(&mut conn, portfolio_id)
    }

    /// Retrieves a portfolio by its ID using an existing connection
    fn get_by_id_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> Result<Portfolio> {
        portfolios
            .find(portfolio_id)
            .first::<PortfolioDB>(conn)
            .map(Portfolio::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => PortfolioError::NotFound(format!(
                    "Portfolio with id {} not found",
                    portfolio_id
                )),
                _ => PortfolioError::DatabaseError(e.to_string()),
            })
    }

    /// Lists all portfolios ordered by name
    fn list(&self) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        portfolios
            .order(name.asc())
            .load::<PortfolioDB>(&mut conn)
            .map(|results| results.into_iter().map(Portfolio::from).collect())
            .map_err(PortfolioError::from)
    }

    /// Lists portfolios owned by the given user
    fn list_by_user(&self, owner_id: &str) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        portfolios
            .filter(user_id.eq(owner_id))
            .order(name.asc())
            .load::<PortfolioDB>(&mut conn)
            .map(|results| results.into_iter().map(Portfolio::from).collect())
            .map_err(PortfolioError::from)
    }

    /// Counts portfolios owned by the given user
    fn count_by_user(&self, owner_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        portfolios
            .filter(user_id.eq(owner_id))
            .count()
            .get_result(&mut conn)
            .map_err(PortfolioError::from)
    }

    /// Applies a partial update (name/description) to an existing portfolio
    fn update(&self, portfolio_id: &str, update: PortfolioUpdate) -> Result<Portfolio> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        let mut portfolio_db = portfolios
            .find(portfolio_id)
            .first::<PortfolioDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => PortfolioError::NotFound(format!(
                    "Portfolio with id {} not found",
                    portfolio_id
                )),
                _ => PortfolioError::DatabaseError(e.to_string()),
            })?;

        if let Some(new_name) = update.name {
            portfolio_db.name = new_name;
        }
        if let Some(new_description) = update.description {
            portfolio_db.description = Some(new_description);
        }
        portfolio_db.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(portfolios.find(portfolio_id))
            .set(&portfolio_db)
            .execute(&mut conn)
            .map_err(PortfolioError::from)?;

        Ok(portfolio_db.into())
    }

    /// Deletes a portfolio by its ID and returns the number of deleted records
    fn delete(&self, portfolio_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        let affected = diesel::delete(portfolios.find(portfolio_id))
            .execute(&mut conn)
            .map_err(PortfolioError::from)?;

        if affected == 0 {
            return Err(PortfolioError::NotFound(format!(
                "Portfolio with id {} not found",
                portfolio_id
            )));
        }

        Ok(affected)
    }

    /// Sums current_value and total_cost over active positions only;
    /// inert (zero-quantity) rows stay stored but do not contribute.
    fn sum_active_positions_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> Result<(Decimal, Decimal)> {
        let rows = positions::table
            .filter(positions::portfolio_id.eq(portfolio_id))
            .filter(positions::quantity.gt(0))
            .select((positions::current_value, positions::total_cost))
            .load::<(String, String)>(conn)
            .map_err(PortfolioError::from)?;

        let mut value_sum = Decimal::ZERO;
        let mut cost_sum = Decimal::ZERO;
        for (value, cost) in rows {
            value_sum += parse_decimal(&value, "position.current_value");
            cost_sum += parse_decimal(&cost, "position.total_cost");
        }

        Ok((value_sum, cost_sum))
    }

    /// Counts active positions for a portfolio
    fn count_active_positions_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> Result<i64> {
        positions::table
            .filter(positions::portfolio_id.eq(portfolio_id))
            .filter(positions::quantity.gt(0))
            .count()
            .get_result(conn)
            .map_err(PortfolioError::from)
    }

    /// Writes the derived aggregate totals onto the portfolio row
    fn set_totals_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        new_total_value: Decimal,
        new_total_cost: Decimal,
    ) -> Result<Portfolio> {
        let affected = diesel::update(portfolios.find(portfolio_id))
            .set((
                total_value.eq(new_total_value.to_string()),
                total_cost.eq(new_total_cost.to_string()),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(PortfolioError::from)?;

        if affected == 0 {
            return Err(PortfolioError::NotFound(format!(
                "Portfolio with id {} not found",
                portfolio_id
            )));
        }

        self.get_by_id_in(conn, portfolio_id)
    }
}
