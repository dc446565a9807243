use async_trait::async_trait;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::stocks_errors::Result as StockResult;
use super::stocks_model::{NewStock, Stock, StockUpdate};
use crate::errors::Result;

/// Trait defining the contract for stock repository operations.
pub trait StockRepositoryTrait: Send + Sync {
    fn create(&self, new_stock: NewStock) -> StockResult<Stock>;
    fn get_by_id(&self, stock_id: &str) -> StockResult<Stock>;
    fn get_by_id_in(&self, conn: &mut SqliteConnection, stock_id: &str) -> StockResult<Stock>;
    fn get_by_symbol(&self, symbol: &str) -> StockResult<Stock>;
    fn get_by_symbols(&self, symbols: &[String]) -> StockResult<Vec<Stock>>;
    fn list(&self) -> StockResult<Vec<Stock>>;
    fn search(&self, term: &str) -> StockResult<Vec<Stock>>;
    fn list_by_sector(&self, sector: &str) -> StockResult<Vec<Stock>>;
    fn list_sectors(&self) -> StockResult<Vec<String>>;
    fn update(&self, stock_id: &str, update: StockUpdate) -> StockResult<Stock>;
    fn update_price(&self, stock_id: &str, price: Decimal) -> StockResult<Stock>;
}

/// Trait defining the contract for stock catalog service operations.
#[async_trait]
pub trait StockServiceTrait: Send + Sync {
    fn get_stock(&self, stock_id: &str) -> Result<Stock>;
    fn get_stock_in(&self, conn: &mut SqliteConnection, stock_id: &str) -> Result<Stock>;
    fn get_stock_by_symbol(&self, symbol: &str) -> Result<Stock>;
    fn get_stocks_by_symbols(&self, symbols: &[String]) -> Result<Vec<Stock>>;
    fn get_all_stocks(&self) -> Result<Vec<Stock>>;
    fn search_stocks(&self, term: &str) -> Result<Vec<Stock>>;
    fn get_stocks_by_sector(&self, sector: &str) -> Result<Vec<Stock>>;
    fn get_all_sectors(&self) -> Result<Vec<String>>;
    async fn create_stock(&self, new_stock: NewStock) -> Result<Stock>;
    async fn update_stock(&self, stock_id: &str, update: StockUpdate) -> Result<Stock>;
    async fn update_stock_price(&self, stock_id: &str, price: Decimal) -> Result<Stock>;
    async fn update_stock_price_by_symbol(&self, symbol: &str, price: Decimal) -> Result<Stock>;
    async fn get_or_create_stock(
        &self,
        symbol: &str,
        company_name: &str,
        price: Option<Decimal>,
    ) -> Result<Stock>;
}
