//! Fixed-table price oracle adapter.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::domain::error::TradebookError;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;

/// Reference [`PricePort`]: quotes a fixed symbol table and fails for
/// anything else. Symbols are case-insensitive (stored uppercased).
pub struct FixedPriceAdapter {
    quotes: BTreeMap<String, Decimal>,
}

impl FixedPriceAdapter {
    pub fn new() -> Self {
        Self {
            quotes: BTreeMap::new(),
        }
    }

    pub fn with_quote(mut self, symbol: &str, price: Decimal) -> Self {
        self.quotes.insert(symbol.trim().to_uppercase(), price);
        self
    }

    /// Build from the `[prices]` config section; falls back to the
    /// reference table when the section is absent or empty. Validation of
    /// the section happens separately, so an unparseable or non-positive
    /// entry is refused here too.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradebookError> {
        let keys = config.keys("prices");
        if keys.is_empty() {
            return Ok(Self::default());
        }

        let mut adapter = Self::new();
        for key in keys {
            let price = config.get_decimal("prices", &key).ok_or_else(|| {
                TradebookError::ConfigInvalid {
                    section: "prices".to_string(),
                    key: key.clone(),
                    reason: "not a decimal price".to_string(),
                }
            })?;
            if price <= Decimal::ZERO {
                return Err(TradebookError::ConfigInvalid {
                    section: "prices".to_string(),
                    key,
                    reason: "price must be positive".to_string(),
                });
            }
            adapter = adapter.with_quote(&key, price);
        }
        Ok(adapter)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.quotes.keys().cloned().collect()
    }
}

impl Default for FixedPriceAdapter {
    /// The reference symbol table.
    fn default() -> Self {
        Self::new()
            .with_quote("AAPL", dec!(170.00))
            .with_quote("TSLA", dec!(250.00))
            .with_quote("GOOGL", dec!(2800.00))
    }
}

impl PricePort for FixedPriceAdapter {
    fn get_price(&self, symbol: &str) -> Result<Decimal, TradebookError> {
        self.quotes
            .get(&symbol.trim().to_uppercase())
            .copied()
            .ok_or_else(|| TradebookError::PriceUnavailable {
                symbol: symbol.to_string(),
            })
    }
}
