//! Cash deposits and withdrawals.

use rust_decimal::Decimal;

use super::error::TradebookError;
use super::response::Response;
use super::store::{AccountStore, StateChange};
use super::transaction::{Transaction, TransactionKind};

/// Deposit/withdraw operations against the account store. The only writer
/// of the `total_deposits` / `total_withdrawals` aggregates.
pub struct MoneyService<'a> {
    store: &'a AccountStore,
}

impl<'a> MoneyService<'a> {
    pub fn new(store: &'a AccountStore) -> Self {
        Self { store }
    }

    pub fn deposit(&self, amount: Decimal) -> Response<Transaction> {
        Response::from_result(self.try_deposit(amount), |tx| {
            format!(
                "deposited {amount}, cash balance {}",
                tx.resulting_cash_balance
            )
        })
    }

    pub fn try_deposit(&self, amount: Decimal) -> Result<Transaction, TradebookError> {
        if amount <= Decimal::ZERO {
            return Err(TradebookError::InvalidAmount {
                reason: format!("deposit amount must be positive, got {amount}"),
            });
        }
        self.store.apply(|account| {
            Ok(StateChange {
                kind: TransactionKind::Deposit,
                amount,
                cash_balance: account.cash_balance + amount,
                holdings: account.holdings.clone(),
                total_deposits: account.total_deposits + amount,
                total_withdrawals: account.total_withdrawals,
            })
        })
    }

    pub fn withdraw(&self, amount: Decimal) -> Response<Transaction> {
        Response::from_result(self.try_withdraw(amount), |tx| {
            format!(
                "withdrew {amount}, cash balance {}",
                tx.resulting_cash_balance
            )
        })
    }

    /// Fails rather than clamps: a withdrawal may take the balance to
    /// exactly zero but never below it.
    pub fn try_withdraw(&self, amount: Decimal) -> Result<Transaction, TradebookError> {
        if amount <= Decimal::ZERO {
            return Err(TradebookError::InvalidAmount {
                reason: format!("withdrawal amount must be positive, got {amount}"),
            });
        }
        self.store.apply(|account| {
            if amount > account.cash_balance {
                return Err(TradebookError::InsufficientFunds {
                    required: amount,
                    available: account.cash_balance,
                });
            }
            Ok(StateChange {
                kind: TransactionKind::Withdrawal,
                amount: -amount,
                cash_balance: account.cash_balance - amount,
                holdings: account.holdings.clone(),
                total_deposits: account.total_deposits,
                total_withdrawals: account.total_withdrawals + amount,
            })
        })
    }
}
