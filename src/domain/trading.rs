//! Buy and sell execution against the price oracle.

use rust_decimal::Decimal;

use super::error::TradebookError;
use super::response::Response;
use super::store::{AccountStore, StateChange};
use super::transaction::{Transaction, TransactionKind};
use crate::ports::price_port::PricePort;

/// Market-order execution: all-or-nothing fills, no partial quantities.
///
/// Prices are fetched from the [`PricePort`] before the write path is
/// entered, so a slow or failing oracle never holds the account's write
/// lock; affordability and holdings are re-validated against the fetched
/// price inside the commit cycle.
pub struct TradingService<'a> {
    store: &'a AccountStore,
    prices: &'a dyn PricePort,
}

impl<'a> TradingService<'a> {
    pub fn new(store: &'a AccountStore, prices: &'a dyn PricePort) -> Self {
        Self { store, prices }
    }

    pub fn buy(&self, symbol: &str, quantity: i64) -> Response<Transaction> {
        Response::from_result(self.try_buy(symbol, quantity), |tx| {
            format!(
                "bought {} {} at {}, cash balance {}",
                tx.kind.quantity().unwrap_or(0),
                tx.kind.symbol().unwrap_or(""),
                tx.kind.price_per_share().unwrap_or_default(),
                tx.resulting_cash_balance
            )
        })
    }

    pub fn try_buy(&self, symbol: &str, quantity: i64) -> Result<Transaction, TradebookError> {
        let quantity = positive_quantity(quantity)?;
        let symbol = normalize_symbol(symbol);

        let price = self.prices.get_price(&symbol)?;
        let total_cost = price * Decimal::from(quantity);

        self.store.apply(|account| {
            if total_cost > account.cash_balance {
                return Err(TradebookError::InsufficientFunds {
                    required: total_cost,
                    available: account.cash_balance,
                });
            }
            let mut holdings = account.holdings.clone();
            *holdings.entry(symbol.clone()).or_insert(0) += quantity;
            Ok(StateChange {
                kind: TransactionKind::Buy {
                    symbol: symbol.clone(),
                    quantity,
                    price_per_share: price,
                },
                amount: -total_cost,
                cash_balance: account.cash_balance - total_cost,
                holdings,
                total_deposits: account.total_deposits,
                total_withdrawals: account.total_withdrawals,
            })
        })
    }

    pub fn sell(&self, symbol: &str, quantity: i64) -> Response<Transaction> {
        Response::from_result(self.try_sell(symbol, quantity), |tx| {
            format!(
                "sold {} {} at {}, cash balance {}",
                tx.kind.quantity().unwrap_or(0),
                tx.kind.symbol().unwrap_or(""),
                tx.kind.price_per_share().unwrap_or_default(),
                tx.resulting_cash_balance
            )
        })
    }

    /// Selling an unheld symbol is the `held = 0` case of the holdings
    /// check, not a silent no-op. The check runs before the oracle is
    /// consulted: a rejected sell must not depend on the oracle answering.
    pub fn try_sell(&self, symbol: &str, quantity: i64) -> Result<Transaction, TradebookError> {
        let quantity = positive_quantity(quantity)?;
        let symbol = normalize_symbol(symbol);

        let held = self.store.read(|account| account.quantity_held(&symbol))?;
        if quantity > held {
            return Err(TradebookError::InsufficientShares {
                symbol,
                requested: quantity,
                held,
            });
        }

        let price = self.prices.get_price(&symbol)?;
        let proceeds = price * Decimal::from(quantity);

        self.store.apply(|account| {
            // Re-validate at commit time: the precheck ran outside the lock.
            let held = account.quantity_held(&symbol);
            if quantity > held {
                return Err(TradebookError::InsufficientShares {
                    symbol: symbol.clone(),
                    requested: quantity,
                    held,
                });
            }
            let mut holdings = account.holdings.clone();
            let remaining = held - quantity;
            if remaining == 0 {
                holdings.remove(&symbol);
            } else {
                holdings.insert(symbol.clone(), remaining);
            }
            Ok(StateChange {
                kind: TransactionKind::Sell {
                    symbol: symbol.clone(),
                    quantity,
                    price_per_share: price,
                },
                amount: proceeds,
                cash_balance: account.cash_balance + proceeds,
                holdings,
                total_deposits: account.total_deposits,
                total_withdrawals: account.total_withdrawals,
            })
        })
    }
}

fn positive_quantity(quantity: i64) -> Result<u64, TradebookError> {
    if quantity <= 0 {
        return Err(TradebookError::InvalidAmount {
            reason: format!("quantity must be positive, got {quantity}"),
        });
    }
    Ok(quantity as u64)
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
