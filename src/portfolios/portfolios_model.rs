use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::portfolios_errors::{PortfolioError, Result};
use crate::utils::{parse_decimal, round_half_up, PERCENT_SCALE};

/// Domain model for a portfolio. total_value and total_cost are derived
/// aggregates over the portfolio's active positions; they are refreshed
/// after every recorded or deleted transaction.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Portfolio {
    pub fn gain_loss(&self) -> Decimal {
        self.total_value - self.total_cost
    }

    /// Gain/loss as a percentage of cost, quotient rounded half-up to 4
    /// decimals before scaling. Zero when there is no cost basis.
    pub fn gain_loss_percentage(&self) -> Decimal {
        if self.total_cost.is_zero() {
            return Decimal::ZERO;
        }
        round_half_up(self.gain_loss() / self.total_cost, PERCENT_SCALE) * Decimal::ONE_HUNDRED
    }
}

/// Input model for creating a new portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
}

impl NewPortfolio {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(PortfolioError::InvalidData(
                "Portfolio must have a valid owner".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(PortfolioError::InvalidData(
                "Portfolio name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input model for updating an existing portfolio; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl PortfolioUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(PortfolioError::InvalidData(
                    "Portfolio name cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Portfolio statistics returned alongside the portfolio itself
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub portfolio: Portfolio,
    pub position_count: i64,
    pub gain_loss: Decimal,
    pub gain_loss_percentage: Decimal,
}

/// Database model for portfolios
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
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_value: String,
    pub total_cost: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<PortfolioDB> for Portfolio {
    fn from(db: PortfolioDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            description: db.description,
            total_value: parse_decimal(&db.total_value, "portfolio.total_value"),
            total_cost: parse_decimal(&db.total_cost, "portfolio.total_cost"),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewPortfolio> for PortfolioDB {
    fn from(domain: NewPortfolio) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: domain.user_id,
            name: domain.name,
            description: domain.description,
            total_value: Decimal::ZERO.to_string(),
            total_cost: Decimal::ZERO.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
