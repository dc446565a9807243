use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::transactions_errors::Result as TransactionResult;
use super::transactions_model::{NewTransaction, Transaction, TransactionSummary, TransactionType};
use crate::errors::Result;
use crate::positions::Position;

/// Trait defining the contract for transaction repository operations.
pub trait TransactionRepositoryTrait: Send + Sync {
    fn insert_in(
        &self,
        conn: &mut SqliteConnection,
        new_transaction: NewTransaction,
    ) -> TransactionResult<Transaction>;
    fn get_by_id(&self, transaction_id: &str) -> TransactionResult<Transaction>;
    fn delete_in(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> TransactionResult<usize>;
    fn update_fees_in(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
        fees: Decimal,
    ) -> TransactionResult<Transaction>;
    /// Newest first.
    fn list_by_portfolio(&self, portfolio_id: &str) -> TransactionResult<Vec<Transaction>>;
    fn list_by_type(
        &self,
        portfolio_id: &str,
        transaction_type: TransactionType,
    ) -> TransactionResult<Vec<Transaction>>;
    fn list_by_date_range(
        &self,
        portfolio_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> TransactionResult<Vec<Transaction>>;
    /// The newest `limit` entries; the limit is applied in the query.
    fn list_recent(&self, portfolio_id: &str, limit: i64) -> TransactionResult<Vec<Transaction>>;
    /// Replay order for one (portfolio, stock) pair: transaction date
    /// ascending, id as the tie-breaker.
    fn list_for_pair_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        stock_id: &str,
    ) -> TransactionResult<Vec<Transaction>>;
}

/// Trait defining the contract for the transaction ledger service. Mutations
/// run as a single unit of work that also folds the entry into the pair's
/// position and refreshes the portfolio aggregates.
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    async fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    async fn delete_transaction(&self, transaction_id: &str) -> Result<Position>;
    async fn update_transaction_fees(
        &self,
        transaction_id: &str,
        fees: Decimal,
    ) -> Result<Transaction>;
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    fn get_transactions_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Transaction>>;
    fn get_transactions_by_type(
        &self,
        portfolio_id: &str,
        transaction_type: TransactionType,
    ) -> Result<Vec<Transaction>>;
    fn get_transactions_by_date_range(
        &self,
        portfolio_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>>;
    fn get_recent_transactions(
        &self,
        portfolio_id: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>>;
    fn get_transaction_summary(&self, portfolio_id: &str) -> Result<TransactionSummary>;
}
