use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Scale used for per-share money amounts (average cost).
pub const MONEY_SCALE: u32 = 2;
/// Scale used for gain/loss percentages.
pub const PERCENT_SCALE: u32 = 4;

/// Rounds half-up (midpoint away from zero) at the given scale.
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a stored decimal column, falling back through f64 for values
/// persisted in scientific notation. Unparseable values become ZERO.
pub(crate) fn parse_decimal(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(e_decimal) => match f64::from_str(value_str) {
            Ok(f_val) => Decimal::from_f64(f_val).unwrap_or_else(|| {
                log::error!(
                    "Failed to convert {} '{}' (parsed as f64: {}) to Decimal.",
                    field_name,
                    value_str,
                    f_val
                );
                Decimal::ZERO
            }),
            Err(e_f64) => {
                log::error!(
                    "Failed to parse {} '{}': as Decimal (err: {}), and as f64 (err: {}). Falling back to ZERO.",
                    field_name, value_str, e_decimal, e_f64
                );
                Decimal::ZERO
            }
        },
    }
}
