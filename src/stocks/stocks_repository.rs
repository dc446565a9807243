use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::stocks_errors::{Result, StockError};
use super::stocks_model::{NewStock, Stock, StockDB, StockUpdate};
use super::stocks_traits::StockRepositoryTrait;
use crate::db::get_connection;
use crate::schema::stocks;
use crate::schema::stocks::dsl::*;

/// Repository for managing stock catalog data in the database
pub struct StockRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl StockRepository {
    /// Creates a new StockRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl StockRepositoryTrait for StockRepository {
    /// Inserts a new stock; the symbol must not already exist
    fn create(&self, new_stock: NewStock) -> Result<Stock> {
        new_stock.validate()?;

        let stock_db: StockDB = new_stock.into();

        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;

        diesel::insert_into(stocks::table)
            .values(&stock_db)
            .execute(&mut conn)
            .map_err(StockError::from)?;

        Ok(stock_db.into())
    }

    /// Retrieves a stock by its ID
    fn get_by_id(&self, stock_id: &str) -> Result<Stock> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;
        self.get_by_id_in(&mut conn, stock_id)
    }

    /// Retrieves a stock by its ID using an existing connection
    fn get_by_id_in(&self, conn: &mut SqliteConnection, stock_id: &str) -> Result<Stock> {
        stocks
            .find(stock_id)
            .first::<StockDB>(conn)
            .map(Stock::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    StockError::NotFound(format!("Stock with id {} not found", stock_id))
                }
                _ => StockError::DatabaseError(e.to_string()),
            })
    }

    /// Retrieves a stock by its symbol (uppercase-normalized)
    fn get_by_symbol(&self, stock_symbol: &str) -> Result<Stock> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;

        stocks
            .filter(symbol.eq(stock_symbol.to_uppercase()))
            .first::<StockDB>(&mut conn)
            .map(Stock::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => StockError::NotFound(format!(
                    "Stock with symbol {} not found",
                    stock_symbol.to_uppercase()
                )),
                _ => StockError::DatabaseError(e.to_string()),
            })
    }

    /// Retrieves multiple stocks by their symbols
    fn get_by_symbols(&self, symbols: &[String]) -> Result<Vec<Stock>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;

        let upper: Vec<String> = symbols.iter().map(|s| s.to_uppercase()).collect();

        stocks
            .filter(symbol.eq_any(upper))
            .order(symbol.asc())
            .load::<StockDB>(&mut conn)
            .map(|results| results.into_iter().map(Stock::from).collect())
            .map_err(StockError::from)
    }

    /// Lists all stocks ordered by symbol
    fn list(&self) -> Result<Vec<Stock>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;

        stocks
            .order(symbol.asc())
            .load::<StockDB>(&mut conn)
            .map(|results| results.into_iter().map(Stock::from).collect())
            .map_err(StockError::from)
    }

    /// Searches stocks by symbol or company name substring
    fn search(&self, term: &str) -> Result<Vec<Stock>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;

        let pattern = format!("%{}%", term);

        stocks
            .filter(
                symbol
                    .like(pattern.to_uppercase())
                    .or(company_name.like(&pattern)),
            )
            .order(symbol.asc())
            .load::<StockDB>(&mut conn)
            .map(|results| results.into_iter().map(Stock::from).collect())
            .map_err(StockError::from)
    }

    /// Lists stocks in a sector ordered by company name
    fn list_by_sector(&self, sector_name: &str) -> Result<Vec<Stock>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;

        stocks
            .filter(sector.eq(sector_name))
            .order(company_name.asc())
            .load::<StockDB>(&mut conn)
            .map(|results| results.into_iter().map(Stock::from).collect())
            .map_err(StockError::from)
    }

    /// Lists the distinct sectors present in the catalog
    fn list_sectors(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;

        stocks
            .filter(sector.is_not_null())
            .select(sector)
            .distinct()
            .order(sector.asc())
            .load::<Option<String>>(&mut conn)
            .map(|results| results.into_iter().flatten().collect())
            .map_err(StockError::from)
    }

    /// Applies a partial update to an existing stock
    fn update(&self, stock_id: &str, update: StockUpdate) -> Result<Stock> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;

        let mut stock_db = stocks
            .find(stock_id)
            .first::<StockDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    StockError::NotFound(format!("Stock with id {} not found", stock_id))
                }
                _ => StockError::DatabaseError(e.to_string()),
            })?;

        let now = chrono::Utc::now().naive_utc();
        if let Some(name) = update.company_name {
            stock_db.company_name = name;
        }
        if let Some(sector_name) = update.sector {
            stock_db.sector = Some(sector_name);
        }
        if let Some(cap) = update.market_cap {
            stock_db.market_cap = Some(cap.to_string());
        }
        if let Some(price) = update.current_price {
            stock_db.current_price = price.to_string();
            stock_db.last_updated = now;
        }
        stock_db.updated_at = now;

        diesel::update(stocks.find(stock_id))
            .set(&stock_db)
            .execute(&mut conn)
            .map_err(StockError::from)?;

        Ok(stock_db.into())
    }

    /// Sets a stock's current price and refreshes its last_updated marker
    fn update_price(&self, stock_id: &str, new_price: Decimal) -> Result<Stock> {
        if new_price.is_sign_negative() {
            return Err(StockError::InvalidData(
                "Stock price cannot be negative".to_string(),
            ));
        }

        let mut conn = get_connection(&self.pool)
            .map_err(|e| StockError::DatabaseError(e.to_string()))?;

        let now = chrono::Utc::now().naive_utc();
        let affected = diesel::update(stocks.find(stock_id))
            .set((
                current_price.eq(new_price.to_string()),
                last_updated.eq(now),
                updated_at.eq(now),
            ))
            .execute(&mut conn)
            .map_err(StockError::from)?;

        if affected == 0 {
            return Err(StockError::NotFound(format!(
                "Stock with id {} not found",
                stock_id
            )));
        }

        self.get_by_id(stock_id)
    }
}
