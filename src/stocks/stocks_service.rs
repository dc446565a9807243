use async_trait::async_trait;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::stocks_errors::StockError;
use super::stocks_model::{NewStock, Stock, StockUpdate};
use super::stocks_repository::StockRepository;
use super::stocks_traits::{StockRepositoryTrait, StockServiceTrait};
use crate::errors::Result;

/// Service for the stock catalog: symbol lookup, get-or-create and price updates
pub struct StockService {
    repository: Arc<dyn StockRepositoryTrait>,
}

impl StockService {
    /// Creates a new StockService instance backed by the given pool
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repository: Arc::new(StockRepository::new(pool)),
        }
    }
}

#[async_trait]
impl StockServiceTrait for StockService {
    fn get_stock(&self, stock_id: &str) -> Result<Stock> {
        Ok(self.repository.get_by_id(stock_id)?)
    }

    fn get_stock_in(&self, conn: &mut SqliteConnection, stock_id: &str) -> Result<Stock> {
        Ok(self.repository.get_by_id_in(conn, stock_id)?)
    }

    fn get_stock_by_symbol(&self, symbol: &str) -> Result<Stock> {
        Ok(self.repository.get_by_symbol(symbol)?)
    }

    fn get_stocks_by_symbols(&self, symbols: &[String]) -> Result<Vec<Stock>> {
        Ok(self.repository.get_by_symbols(symbols)?)
    }

    fn get_all_stocks(&self) -> Result<Vec<Stock>> {
        Ok(self.repository.list()?)
    }

    fn search_stocks(&self, term: &str) -> Result<Vec<Stock>> {
        let term = term.trim();
        if term.is_empty() {
            return self.get_all_stocks();
        }
        Ok(self.repository.search(term)?)
    }

    fn get_stocks_by_sector(&self, sector: &str) -> Result<Vec<Stock>> {
        Ok(self.repository.list_by_sector(sector)?)
    }

    fn get_all_sectors(&self) -> Result<Vec<String>> {
        Ok(self.repository.list_sectors()?)
    }

    async fn create_stock(&self, new_stock: NewStock) -> Result<Stock> {
        if self
            .repository
            .get_by_symbol(&new_stock.symbol)
            .is_ok()
        {
            return Err(StockError::AlreadyExists(format!(
                "Stock already exists with symbol: {}",
                new_stock.symbol.to_uppercase()
            ))
            .into());
        }
        Ok(self.repository.create(new_stock)?)
    }

    async fn update_stock(&self, stock_id: &str, update: StockUpdate) -> Result<Stock> {
        Ok(self.repository.update(stock_id, update)?)
    }

    async fn update_stock_price(&self, stock_id: &str, price: Decimal) -> Result<Stock> {
        Ok(self.repository.update_price(stock_id, price)?)
    }

    async fn update_stock_price_by_symbol(&self, symbol: &str, price: Decimal) -> Result<Stock> {
        let stock = self.repository.get_by_symbol(symbol)?;
        Ok(self.repository.update_price(&stock.id, price)?)
    }

    /// Returns the stock for the symbol, creating it when absent. A provided
    /// price refreshes an existing stock's quote.
    async fn get_or_create_stock(
        &self,
        symbol: &str,
        company_name: &str,
        price: Option<Decimal>,
    ) -> Result<Stock> {
        match self.repository.get_by_symbol(symbol) {
            Ok(stock) => match price {
                Some(new_price) => Ok(self.repository.update_price(&stock.id, new_price)?),
                None => Ok(stock),
            },
            Err(StockError::NotFound(_)) => {
                debug!("Creating catalog entry for symbol {}", symbol);
                let new_stock = NewStock {
                    id: None,
                    symbol: symbol.to_string(),
                    company_name: company_name.to_string(),
                    sector: None,
                    market_cap: None,
                    current_price: price.unwrap_or(Decimal::ZERO),
                };
                Ok(self.repository.create(new_stock)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}
