use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::transactions_errors::TransactionError;
use super::transactions_model::{NewTransaction, Transaction, TransactionSummary, TransactionType};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::Result;
use crate::portfolios::PortfolioServiceTrait;
use crate::positions::{Position, PositionServiceTrait};
use crate::stocks::StockServiceTrait;

/// Service for the transaction ledger. Every mutation is one unit of work:
/// the ledger write, the position update and the portfolio aggregate refresh
/// commit together or not at all.
pub struct TransactionService {
    pool: Arc<DbPool>,
    repository: Arc<dyn TransactionRepositoryTrait>,
    position_service: Arc<dyn PositionServiceTrait>,
    portfolio_service: Arc<dyn PortfolioServiceTrait>,
    stock_service: Arc<dyn StockServiceTrait>,
}

impl TransactionService {
    /// Creates a new TransactionService instance with injected dependencies
    pub fn new(
        pool: Arc<DbPool>,
        repository: Arc<dyn TransactionRepositoryTrait>,
        position_service: Arc<dyn PositionServiceTrait>,
        portfolio_service: Arc<dyn PortfolioServiceTrait>,
        stock_service: Arc<dyn StockServiceTrait>,
    ) -> Self {
        Self {
            pool,
            repository,
            position_service,
            portfolio_service,
            stock_service,
        }
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    /// Records a new ledger entry and folds it into the pair's position.
    /// An oversell is rejected inside the unit of work, so the entry never
    /// persists.
    async fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;

        let transaction = self.pool.execute(|conn| {
            // Parents must exist before the ledger write so a missing
            // portfolio or stock surfaces as NotFound, not as a
            // foreign-key failure from the insert.
            self.portfolio_service
                .get_portfolio_in(conn, &new_transaction.portfolio_id)?;
            self.stock_service
                .get_stock_in(conn, &new_transaction.stock_id)?;

            let transaction = self.repository.insert_in(conn, new_transaction)?;
            self.position_service.apply_transaction_in(conn, &transaction)?;
            self.portfolio_service
                .update_portfolio_values_in(conn, &transaction.portfolio_id)?;
            Ok(transaction)
        })?;

        info!(
            "Recorded {} of {} shares for portfolio {} (transaction {})",
            transaction.transaction_type,
            transaction.quantity,
            transaction.portfolio_id,
            transaction.id
        );
        Ok(transaction)
    }

    /// Deletes a ledger entry and rebuilds the pair's position by replaying
    /// what remains. A replay that oversells at any point aborts the whole
    /// deletion.
    async fn delete_transaction(&self, transaction_id: &str) -> Result<Position> {
        let transaction = self.repository.get_by_id(transaction_id)?;

        let position = self.pool.execute(|conn| {
            self.repository.delete_in(conn, transaction_id)?;
            let position = self.position_service.recalculate_position_in(
                conn,
                &transaction.portfolio_id,
                &transaction.stock_id,
            )?;
            self.portfolio_service
                .update_portfolio_values_in(conn, &transaction.portfolio_id)?;
            Ok(position)
        })?;

        info!(
            "Deleted transaction {} and recomputed position {}",
            transaction_id, position.id
        );
        Ok(position)
    }

    /// Changes the fees of an entry. Fees feed a buy's cost basis, so the
    /// pair's position is rebuilt from its full ledger afterwards.
    async fn update_transaction_fees(
        &self,
        transaction_id: &str,
        fees: Decimal,
    ) -> Result<Transaction> {
        if fees < Decimal::ZERO {
            return Err(TransactionError::InvalidData(format!(
                "Fees cannot be negative, got {}",
                fees
            ))
            .into());
        }

        let existing = self.repository.get_by_id(transaction_id)?;

        self.pool.execute(|conn| {
            let updated = self.repository.update_fees_in(conn, transaction_id, fees)?;
            self.position_service.recalculate_position_in(
                conn,
                &existing.portfolio_id,
                &existing.stock_id,
            )?;
            self.portfolio_service
                .update_portfolio_values_in(conn, &existing.portfolio_id)?;
            debug!(
                "Updated fees on transaction {}: {} -> {}",
                transaction_id, existing.fees, fees
            );
            Ok(updated)
        })
    }

    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        Ok(self.repository.get_by_id(transaction_id)?)
    }

    fn get_transactions_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        self.portfolio_service.get_portfolio(portfolio_id)?;
        Ok(self.repository.list_by_portfolio(portfolio_id)?)
    }

    fn get_transactions_by_type(
        &self,
        portfolio_id: &str,
        transaction_type: TransactionType,
    ) -> Result<Vec<Transaction>> {
        Ok(self.repository.list_by_type(portfolio_id, transaction_type)?)
    }

    fn get_transactions_by_date_range(
        &self,
        portfolio_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>> {
        Ok(self.repository.list_by_date_range(portfolio_id, start, end)?)
    }

    fn get_recent_transactions(
        &self,
        portfolio_id: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>> {
        Ok(self.repository.list_recent(portfolio_id, limit as i64)?)
    }

    /// Folds the whole ledger of a portfolio into counts and totals.
    fn get_transaction_summary(&self, portfolio_id: &str) -> Result<TransactionSummary> {
        self.portfolio_service.get_portfolio(portfolio_id)?;
        let transactions = self.repository.list_by_portfolio(portfolio_id)?;

        let mut summary = TransactionSummary {
            total_transactions: transactions.len() as i64,
            ..Default::default()
        };
        for transaction in &transactions {
            match transaction.transaction_type {
                TransactionType::Buy => {
                    summary.buy_transactions += 1;
                    summary.total_buy_amount += transaction.total_amount;
                }
                TransactionType::Sell => {
                    summary.sell_transactions += 1;
                    summary.total_sell_amount += transaction.total_amount;
                }
            }
            summary.total_fees += transaction.fees;
        }
        summary.net_invested = summary.total_buy_amount - summary.total_sell_amount;

        Ok(summary)
    }
}
