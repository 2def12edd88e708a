//! Configuration validation.
//!
//! Validates all config fields before a session runs.

use rust_decimal::Decimal;

use super::error::TradebookError;
use super::valuation::BaselinePolicy;
use crate::ports::config_port::ConfigPort;

pub fn validate_account_config(config: &dyn ConfigPort) -> Result<(), TradebookError> {
    validate_opening_balance(config)?;
    validate_baseline_policy(config)?;
    Ok(())
}

fn validate_opening_balance(config: &dyn ConfigPort) -> Result<(), TradebookError> {
    let raw = config
        .get_string("account", "opening_balance")
        .ok_or_else(|| TradebookError::ConfigMissing {
            section: "account".to_string(),
            key: "opening_balance".to_string(),
        })?;
    let value =
        config
            .get_decimal("account", "opening_balance")
            .ok_or_else(|| TradebookError::ConfigInvalid {
                section: "account".to_string(),
                key: "opening_balance".to_string(),
                reason: format!("not a decimal amount: {raw}"),
            })?;
    if value <= Decimal::ZERO {
        return Err(TradebookError::ConfigInvalid {
            section: "account".to_string(),
            key: "opening_balance".to_string(),
            reason: "opening_balance must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_baseline_policy(config: &dyn ConfigPort) -> Result<(), TradebookError> {
    match config.get_string("valuation", "baseline") {
        None => Ok(()),
        Some(name) if BaselinePolicy::from_name(&name).is_some() => Ok(()),
        Some(name) => Err(TradebookError::ConfigInvalid {
            section: "valuation".to_string(),
            key: "baseline".to_string(),
            reason: format!("unknown policy {name}, expected net_contributions or gross_deposits"),
        }),
    }
}

/// Every `[prices]` entry must parse as a positive decimal quote.
pub fn validate_price_config(config: &dyn ConfigPort) -> Result<(), TradebookError> {
    for key in config.keys("prices") {
        match config.get_decimal("prices", &key) {
            Some(price) if price > Decimal::ZERO => {}
            Some(_) => {
                return Err(TradebookError::ConfigInvalid {
                    section: "prices".to_string(),
                    key,
                    reason: "price must be positive".to_string(),
                });
            }
            None => {
                return Err(TradebookError::ConfigInvalid {
                    section: "prices".to_string(),
                    key,
                    reason: "not a decimal price".to_string(),
                });
            }
        }
    }
    Ok(())
}
