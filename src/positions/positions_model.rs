use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculator::CostBasis;
use crate::utils::{parse_decimal, round_half_up, PERCENT_SCALE};

/// Domain model for a position: the derived holding of one stock inside one
/// portfolio. A row survives a full sell-out with quantity zero ("inert")
/// and is excluded from portfolio aggregates until the pair trades again.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub quantity: i32,
    pub average_cost: Decimal,
    pub total_cost: Decimal,
    pub current_value: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Position {
    pub fn is_active(&self) -> bool {
        self.quantity > 0
    }

    pub fn gain_loss(&self) -> Decimal {
        self.current_value - self.total_cost
    }

    /// Gain/loss as a percentage of cost, quotient rounded half-up to 4
    /// decimals before scaling. Zero when there is no cost basis.
    pub fn gain_loss_percentage(&self) -> Decimal {
        if self.total_cost.is_zero() {
            return Decimal::ZERO;
        }
        round_half_up(self.gain_loss() / self.total_cost, PERCENT_SCALE) * Decimal::ONE_HUNDRED
    }

    /// The accounting state the calculator operates on.
    pub fn cost_basis(&self) -> CostBasis {
        CostBasis {
            quantity: self.quantity,
            average_cost: self.average_cost,
            total_cost: self.total_cost,
        }
    }
}

/// Database model for positions
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
#[diesel(table_name = crate::schema::positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDB {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub quantity: i32,
    pub average_cost: String,
    pub total_cost: String,
    pub current_value: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PositionDB {
    /// A fresh zero-quantity row for a (portfolio, stock) pair.
    pub fn new(portfolio_id: &str, stock_id: &str) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let zero = Decimal::ZERO.to_string();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            stock_id: stock_id.to_string(),
            quantity: 0,
            average_cost: zero.clone(),
            total_cost: zero.clone(),
            current_value: zero,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<PositionDB> for Position {
    fn from(db: PositionDB) -> Self {
        Self {
            id: db.id,
            portfolio_id: db.portfolio_id,
            stock_id: db.stock_id,
            quantity: db.quantity,
            average_cost: parse_decimal(&db.average_cost, "position.average_cost"),
            total_cost: parse_decimal(&db.total_cost, "position.total_cost"),
            current_value: parse_decimal(&db.current_value, "position.current_value"),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
