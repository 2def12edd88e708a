//! Price oracle port trait.

use crate::domain::error::TradebookError;
use rust_decimal::Decimal;

/// External collaborator supplying current prices.
///
/// An unsupported symbol fails with
/// [`PriceUnavailable`](TradebookError::PriceUnavailable).
pub trait PricePort {
    fn get_price(&self, symbol: &str) -> Result<Decimal, TradebookError>;
}
