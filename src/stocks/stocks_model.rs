use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stocks_errors::{Result, StockError};
use crate::utils::parse_decimal;

/// Domain model for a catalog stock
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: String,
    pub symbol: String,
    pub company_name: String,
    pub sector: Option<String>,
    pub market_cap: Option<Decimal>,
    pub current_price: Decimal,
    pub last_updated: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new stock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub symbol: String,
    pub company_name: String,
    pub sector: Option<String>,
    pub market_cap: Option<Decimal>,
    pub current_price: Decimal,
}

impl NewStock {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(StockError::InvalidData(
                "Stock symbol cannot be empty".to_string(),
            ));
        }
        if self.company_name.trim().is_empty() {
            return Err(StockError::InvalidData(
                "Company name cannot be empty".to_string(),
            ));
        }
        if self.current_price.is_sign_negative() {
            return Err(StockError::InvalidData(
                "Stock price cannot be negative".to_string(),
            ));
        }
        if let Some(cap) = self.market_cap {
            if cap.is_sign_negative() {
                return Err(StockError::InvalidData(
                    "Market cap cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Input model for a partial stock update; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<Decimal>,
    pub current_price: Option<Decimal>,
}

impl StockUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.company_name {
            if name.trim().is_empty() {
                return Err(StockError::InvalidData(
                    "Company name cannot be empty".to_string(),
                ));
            }
        }
        if let Some(price) = self.current_price {
            if price.is_sign_negative() {
                return Err(StockError::InvalidData(
                    "Stock price cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Database model for stocks
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
#[diesel(table_name = crate::schema::stocks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockDB {
    pub id: String,
    pub symbol: String,
    pub company_name: String,
    pub sector: Option<String>,
    pub market_cap: Option<String>,
    pub current_price: String,
    pub last_updated: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<StockDB> for Stock {
    fn from(db: StockDB) -> Self {
        Self {
            id: db.id,
            symbol: db.symbol,
            company_name: db.company_name,
            sector: db.sector,
            market_cap: db
                .market_cap
                .as_deref()
                .map(|cap| parse_decimal(cap, "stock.market_cap")),
            current_price: parse_decimal(&db.current_price, "stock.current_price"),
            last_updated: db.last_updated,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewStock> for StockDB {
    fn from(domain: NewStock) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            symbol: domain.symbol.to_uppercase(),
            company_name: domain.company_name,
            sector: domain.sector,
            market_cap: domain.market_cap.map(|cap| cap.to_string()),
            current_price: domain.current_price.to_string(),
            last_updated: now,
            created_at: now,
            updated_at: now,
        }
    }
}
