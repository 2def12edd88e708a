//! Account ownership and the single mutation entry point.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::RwLock;

use super::account::Account;
use super::error::TradebookError;
use super::transaction::{Transaction, TransactionKind};

/// A fully-computed replacement state, produced by a mutation closure.
///
/// The store commits all of it plus the appended transaction, or none of it.
#[derive(Debug, Clone)]
pub struct StateChange {
    pub kind: TransactionKind,
    /// Signed cash effect recorded on the transaction.
    pub amount: Decimal,
    pub cash_balance: Decimal,
    pub holdings: BTreeMap<String, u64>,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
}

/// Owns the one mutable [`Account`] behind a read-write lock.
///
/// All writes go through [`open`](AccountStore::open) and
/// [`apply`](AccountStore::apply); readers take the shared lock and may run
/// concurrently. Mutations serialize on the write lock for one
/// read-validate-write cycle, so no two of them interleave and no partial
/// field update is ever observable.
#[derive(Debug, Default)]
pub struct AccountStore {
    inner: RwLock<Option<Account>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Initialize the account with an opening cash balance.
    ///
    /// Records the opening balance as the first `Deposit` transaction.
    pub fn open(&self, initial_cash: Decimal) -> Result<Transaction, TradebookError> {
        if initial_cash <= Decimal::ZERO {
            return Err(TradebookError::InvalidAmount {
                reason: format!("opening balance must be positive, got {initial_cash}"),
            });
        }

        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        if guard.is_some() {
            return Err(TradebookError::AlreadyInitialized);
        }

        let opened_at = Utc::now();
        let transaction = Transaction {
            timestamp: opened_at,
            kind: TransactionKind::Deposit,
            amount: initial_cash,
            resulting_cash_balance: initial_cash,
            resulting_holdings: BTreeMap::new(),
        };
        *guard = Some(Account {
            cash_balance: initial_cash,
            holdings: BTreeMap::new(),
            transactions: vec![transaction.clone()],
            total_deposits: initial_cash,
            total_withdrawals: Decimal::ZERO,
            opened_at,
        });
        Ok(transaction)
    }

    /// Run one atomic read-validate-write cycle.
    ///
    /// `mutate` reads the current account and returns either a complete
    /// [`StateChange`] or a rejection. On `Ok` the store appends a
    /// transaction (timestamp clamped to be non-decreasing, post-state
    /// snapshotted onto the record) and installs the new state; on `Err`
    /// nothing changes. A change that would break the cash or holdings
    /// invariant is refused outright — services reject those cases with
    /// their own domain errors first, so reaching this guard is a bug.
    pub fn apply<F>(&self, mutate: F) -> Result<Transaction, TradebookError>
    where
        F: FnOnce(&Account) -> Result<StateChange, TradebookError>,
    {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        let account = guard.as_mut().ok_or(TradebookError::NotInitialized)?;

        let change = mutate(account)?;
        if change.cash_balance < Decimal::ZERO {
            return Err(TradebookError::Internal {
                reason: format!(
                    "state change would leave negative cash ({})",
                    change.cash_balance
                ),
            });
        }
        if change.holdings.values().any(|&quantity| quantity == 0) {
            return Err(TradebookError::Internal {
                reason: "state change carries a zero-quantity holding".into(),
            });
        }

        let now = Utc::now();
        let timestamp = match account.transactions.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        let transaction = Transaction {
            timestamp,
            kind: change.kind,
            amount: change.amount,
            resulting_cash_balance: change.cash_balance,
            resulting_holdings: change.holdings.clone(),
        };

        account.cash_balance = change.cash_balance;
        account.holdings = change.holdings;
        account.total_deposits = change.total_deposits;
        account.total_withdrawals = change.total_withdrawals;
        account.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// Read under the shared lock.
    pub fn read<T, F>(&self, view: F) -> Result<T, TradebookError>
    where
        F: FnOnce(&Account) -> T,
    {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        let account = guard.as_ref().ok_or(TradebookError::NotInitialized)?;
        Ok(view(account))
    }

    /// Clone the account for lock-free consumers.
    pub fn snapshot(&self) -> Result<Account, TradebookError> {
        self.read(Account::clone)
    }

    pub fn is_open(&self) -> bool {
        self.inner.read().map(|guard| guard.is_some()).unwrap_or(false)
    }
}

fn poisoned() -> TradebookError {
    TradebookError::Internal {
        reason: "account store lock poisoned".into(),
    }
}
