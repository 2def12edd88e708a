//! Account state: cash, holdings, and the transaction log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::transaction::Transaction;

/// The single account's state.
///
/// Invariants, maintained by [`AccountStore`](super::store::AccountStore):
/// cash never negative, holdings quantities strictly positive (emptied
/// symbols are removed), and the transaction log append-only with
/// non-decreasing timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub cash_balance: Decimal,
    /// Symbol to whole-share quantity. `BTreeMap` keeps valuation and
    /// statement rows in a deterministic order.
    pub holdings: BTreeMap<String, u64>,
    pub transactions: Vec<Transaction>,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub opened_at: DateTime<Utc>,
}

impl Account {
    pub fn quantity_held(&self, symbol: &str) -> u64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    /// Fold the whole transaction log over an empty accumulator.
    pub fn replay(&self) -> (Decimal, BTreeMap<String, u64>) {
        let mut cash = Decimal::ZERO;
        let mut holdings = BTreeMap::new();
        for tx in &self.transactions {
            tx.apply_to(&mut cash, &mut holdings);
        }
        (cash, holdings)
    }

    /// Whether replaying the log reproduces the live state exactly.
    pub fn log_is_consistent(&self) -> bool {
        let (cash, holdings) = self.replay();
        cash == self.cash_balance && holdings == self.holdings
    }
}
