use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transactions_errors::{Result, TransactionError};
use crate::utils::parse_decimal;

/// The two sides of the ledger. Stored as upper-case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "BUY" => Ok(TransactionType::Buy),
            "SELL" => Ok(TransactionType::Sell),
            other => Err(TransactionError::InvalidData(format!(
                "Unknown transaction type '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model for an immutable ledger entry. Only `fees` may change after
/// recording; everything else is fixed at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub transaction_type: TransactionType,
    pub quantity: i32,
    pub price_per_share: Decimal,
    pub total_amount: Decimal,
    pub fees: Decimal,
    pub transaction_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Cash impact of the entry: buys cost `total + fees`, sells yield
    /// `total - fees`.
    pub fn net_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Buy => self.total_amount + self.fees,
            TransactionType::Sell => self.total_amount - self.fees,
        }
    }
}

/// Payload for recording a new ledger entry. `total_amount` is always
/// derived as quantity x price, never supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub portfolio_id: String,
    pub stock_id: String,
    pub transaction_type: TransactionType,
    pub quantity: i32,
    pub price_per_share: Decimal,
    #[serde(default)]
    pub fees: Option<Decimal>,
    #[serde(default)]
    pub transaction_date: Option<NaiveDateTime>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.portfolio_id.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Portfolio id cannot be empty".to_string(),
            ));
        }
        if self.stock_id.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Stock id cannot be empty".to_string(),
            ));
        }
        if self.quantity < 1 {
            return Err(TransactionError::InvalidData(format!(
                "Quantity must be at least 1, got {}",
                self.quantity
            )));
        }
        if self.price_per_share <= Decimal::ZERO {
            return Err(TransactionError::InvalidData(format!(
                "Price per share must be positive, got {}",
                self.price_per_share
            )));
        }
        if let Some(fees) = self.fees {
            if fees < Decimal::ZERO {
                return Err(TransactionError::InvalidData(format!(
                    "Fees cannot be negative, got {}",
                    fees
                )));
            }
        }
        Ok(())
    }

    pub fn total_amount(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price_per_share
    }
}

/// Aggregate view of a portfolio's ledger.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub total_transactions: i64,
    pub buy_transactions: i64,
    pub sell_transactions: i64,
    pub total_buy_amount: Decimal,
    pub total_sell_amount: Decimal,
    pub total_fees: Decimal,
    pub net_invested: Decimal,
}

/// Database model for transactions
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub transaction_type: String,
    pub quantity: i32,
    pub price_per_share: String,
    pub total_amount: String,
    pub fees: String,
    pub transaction_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<NewTransaction> for TransactionDB {
    fn from(new_transaction: NewTransaction) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let fees = new_transaction.fees.unwrap_or(Decimal::ZERO);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: new_transaction.portfolio_id.clone(),
            stock_id: new_transaction.stock_id.clone(),
            transaction_type: new_transaction.transaction_type.as_str().to_string(),
            quantity: new_transaction.quantity,
            price_per_share: new_transaction.price_per_share.to_string(),
            total_amount: new_transaction.total_amount().to_string(),
            fees: fees.to_string(),
            transaction_date: new_transaction.transaction_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = TransactionError;

    fn try_from(db: TransactionDB) -> Result<Self> {
        Ok(Self {
            transaction_type: TransactionType::parse(&db.transaction_type)?,
            id: db.id,
            portfolio_id: db.portfolio_id,
            stock_id: db.stock_id,
            quantity: db.quantity,
            price_per_share: parse_decimal(&db.price_per_share, "transaction.price_per_share"),
            total_amount: parse_decimal(&db.total_amount, "transaction.total_amount"),
            fees: parse_decimal(&db.fees, "transaction.fees"),
            transaction_date: db.transaction_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_buy() -> NewTransaction {
        NewTransaction {
            portfolio_id: "portfolio-1".to_string(),
            stock_id: "stock-1".to_string(),
            transaction_type: TransactionType::Buy,
            quantity: 10,
            price_per_share: dec!(190.23),
            fees: Some(dec!(4.95)),
            transaction_date: None,
        }
    }

    #[test]
    fn total_amount_is_quantity_times_price() {
        assert_eq!(new_buy().total_amount(), dec!(1902.30));
    }

    #[test]
    fn validate_rejects_zero_quantity() {
        let mut payload = new_buy();
        payload.quantity = 0;
        assert!(matches!(
            payload.validate(),
            Err(TransactionError::InvalidData(_))
        ));
    }

    #[test]
    fn validate_rejects_non_positive_price() {
        let mut payload = new_buy();
        payload.price_per_share = Decimal::ZERO;
        assert!(payload.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_fees() {
        let mut payload = new_buy();
        payload.fees = Some(dec!(-0.01));
        assert!(payload.validate().is_err());
    }

    #[test]
    fn missing_fees_persist_as_zero() {
        let mut payload = new_buy();
        payload.fees = None;
        let row = TransactionDB::from(payload);
        assert_eq!(row.fees, "0");
    }

    #[test]
    fn net_amount_adds_fees_on_buys_and_subtracts_on_sells() {
        let row = TransactionDB::from(new_buy());
        let buy = Transaction::try_from(row).unwrap();
        assert_eq!(buy.net_amount(), dec!(1907.25));

        let mut sell = buy.clone();
        sell.transaction_type = TransactionType::Sell;
        sell.total_amount = dec!(800.00);
        sell.fees = dec!(1.00);
        assert_eq!(sell.net_amount(), dec!(799.00));
    }

    #[test]
    fn transaction_type_round_trips_through_text() {
        assert_eq!(TransactionType::parse("BUY").unwrap(), TransactionType::Buy);
        assert_eq!(
            TransactionType::parse("SELL").unwrap(),
            TransactionType::Sell
        );
        assert!(TransactionType::parse("TRANSFER").is_err());
    }
}
