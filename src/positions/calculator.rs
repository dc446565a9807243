//! Weighted-average cost accounting for one (portfolio, stock) pair.
//!
//! Every buy blends into a single running average cost per share; a partial
//! sell reduces the cost basis at that average and leaves the average itself
//! unchanged. No per-lot (FIFO/LIFO) state is tracked.

use rust_decimal::Decimal;

use super::positions_errors::{PositionError, Result};
use crate::transactions::{Transaction, TransactionType};
use crate::utils::{round_half_up, MONEY_SCALE};

/// Running cost-basis state, independent of any stored position row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostBasis {
    pub quantity: i32,
    pub average_cost: Decimal,
    pub total_cost: Decimal,
}

impl CostBasis {
    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }
}

/// Applies a buy: the transaction's full cost (amount plus fees) joins the
/// basis and the average cost is re-derived, rounded half-up to cents.
pub fn apply_buy(
    basis: &CostBasis,
    quantity: i32,
    total_amount: Decimal,
    fees: Decimal,
) -> Result<CostBasis> {
    if quantity <= 0 {
        return Err(PositionError::InvalidData(format!(
            "Buy quantity must be positive, got {}",
            quantity
        )));
    }

    let new_total_cost = basis.total_cost + total_amount + fees;
    let new_quantity = basis.quantity + quantity;
    let new_average_cost = round_half_up(new_total_cost / Decimal::from(new_quantity), MONEY_SCALE);

    Ok(CostBasis {
        quantity: new_quantity,
        average_cost: new_average_cost,
        total_cost: new_total_cost,
    })
}

/// Applies a sell: cost is reduced at the running average and the average
/// itself stays put. Selling the entire holding resets the basis to exact
/// zeros so no rounding residue survives a full liquidation.
pub fn apply_sell(basis: &CostBasis, quantity: i32) -> Result<CostBasis> {
    if quantity <= 0 {
        return Err(PositionError::InvalidData(format!(
            "Sell quantity must be positive, got {}",
            quantity
        )));
    }

    let new_quantity = basis.quantity - quantity;
    if new_quantity < 0 {
        return Err(PositionError::InsufficientShares {
            available: basis.quantity,
            requested: quantity,
        });
    }

    if new_quantity == 0 {
        return Ok(CostBasis::default());
    }

    let cost_reduction = basis.average_cost * Decimal::from(quantity);
    Ok(CostBasis {
        quantity: new_quantity,
        average_cost: basis.average_cost,
        total_cost: basis.total_cost - cost_reduction,
    })
}

/// Applies one ledger transaction to the basis.
pub fn apply(basis: &CostBasis, transaction: &Transaction) -> Result<CostBasis> {
    match transaction.transaction_type {
        TransactionType::Buy => apply_buy(
            basis,
            transaction.quantity,
            transaction.total_amount,
            transaction.fees,
        ),
        TransactionType::Sell => apply_sell(basis, transaction.quantity),
    }
}

/// Replays a transaction history from a zero state. Callers supply the
/// history in chronological order (transaction date, then id); the result
/// is identical to folding `apply` incrementally over the same sequence.
pub fn replay<'a, I>(transactions: I) -> Result<CostBasis>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut basis = CostBasis::default();
    for transaction in transactions {
        basis = apply(&basis, transaction)?;
    }
    Ok(basis)
}
