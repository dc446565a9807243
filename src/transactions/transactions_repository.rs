use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::transactions_errors::{Result, TransactionError};
use super::transactions_model::{NewTransaction, Transaction, TransactionDB, TransactionType};
use super::transactions_traits::TransactionRepositoryTrait;
use crate::db::get_connection;
use crate::schema::transactions;
use crate::schema::transactions::dsl::*;

/// Repository for managing transaction rows in the database
pub struct TransactionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

fn into_domain(rows: Vec<TransactionDB>) -> Result<Vec<Transaction>> {
    rows.into_iter().map(Transaction::try_from).collect()
}

impl TransactionRepositoryTrait for TransactionRepository {
    /// Inserts a new ledger entry
    fn insert_in(
        &self,
        conn: &mut SqliteConnection,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        let transaction_db = TransactionDB::from(new_transaction);

        diesel::insert_into(transactions::table)
            .values(&transaction_db)
            .execute(conn)
            .map_err(TransactionError::from)?;

        Transaction::try_from(transaction_db)
    }

    /// Retrieves a transaction by its ID
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => TransactionError::NotFound(format!(
                    "Transaction with id {} not found",
                    transaction_id
                )),
                _ => TransactionError::DatabaseError(e.to_string()),
            })
            .and_then(Transaction::try_from)
    }

    /// Deletes a ledger entry
    fn delete_in(&self, conn: &mut SqliteConnection, transaction_id: &str) -> Result<usize> {
        let affected = diesel::delete(transactions.find(transaction_id))
            .execute(conn)
            .map_err(TransactionError::from)?;

        if affected == 0 {
            return Err(TransactionError::NotFound(format!(
                "Transaction with id {} not found",
                transaction_id
            )));
        }
        Ok(affected)
    }

    /// Updates the fees of a ledger entry; the rest of the row is immutable
    fn update_fees_in(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
        new_fees: Decimal,
    ) -> Result<Transaction> {
        let affected = diesel::update(transactions.find(transaction_id))
            .set((
                fees.eq(new_fees.to_string()),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(TransactionError::from)?;

        if affected == 0 {
            return Err(TransactionError::NotFound(format!(
                "Transaction with id {} not found",
                transaction_id
            )));
        }

        transactions
            .find(transaction_id)
            .first::<TransactionDB>(conn)
            .map_err(TransactionError::from)
            .and_then(Transaction::try_from)
    }

    /// Lists a portfolio's transactions, newest first
    fn list_by_portfolio(&self, for_portfolio_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions
            .filter(portfolio_id.eq(for_portfolio_id))
            .order(transaction_date.desc())
            .load::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)
            .and_then(into_domain)
    }

    /// Lists a portfolio's transactions of one type, newest first
    fn list_by_type(
        &self,
        for_portfolio_id: &str,
        for_type: TransactionType,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions
            .filter(portfolio_id.eq(for_portfolio_id))
            .filter(transaction_type.eq(for_type.as_str()))
            .order(transaction_date.desc())
            .load::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)
            .and_then(into_domain)
    }

    /// Lists a portfolio's transactions within a date range, newest first
    fn list_by_date_range(
        &self,
        for_portfolio_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions
            .filter(portfolio_id.eq(for_portfolio_id))
            .filter(transaction_date.ge(start))
            .filter(transaction_date.le(end))
            .order(transaction_date.desc())
            .load::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)
            .and_then(into_domain)
    }

    /// Lists the newest entries of a portfolio, bounded in the query
    fn list_recent(&self, for_portfolio_id: &str, limit: i64) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions
            .filter(portfolio_id.eq(for_portfolio_id))
            .order(transaction_date.desc())
            .limit(limit)
            .load::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)
            .and_then(into_domain)
    }

    /// The pair's ledger in replay order: date ascending, id tie-break
    fn list_for_pair_in(
        &self,
        conn: &mut SqliteConnection,
        for_portfolio_id: &str,
        for_stock_id: &str,
    ) -> Result<Vec<Transaction>> {
        transactions
            .filter(portfolio_id.eq(for_portfolio_id))
            .filter(stock_id.eq(for_stock_id))
            .order((transaction_date.asc(), id.asc()))
            .load::<TransactionDB>(conn)
            .map_err(TransactionError::from)
            .and_then(into_domain)
    }
}
