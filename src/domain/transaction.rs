//! Immutable ledger entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// What a transaction did. Trade variants carry their per-share terms;
/// cash movements carry nothing beyond the signed amount on the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Buy {
        symbol: String,
        quantity: u64,
        price_per_share: Decimal,
    },
    Sell {
        symbol: String,
        quantity: u64,
        price_per_share: Decimal,
    },
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::Buy { .. } => "BUY",
            TransactionKind::Sell { .. } => "SELL",
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            TransactionKind::Buy { symbol, .. } | TransactionKind::Sell { symbol, .. } => {
                Some(symbol)
            }
            _ => None,
        }
    }

    pub fn quantity(&self) -> Option<u64> {
        match self {
            TransactionKind::Buy { quantity, .. } | TransactionKind::Sell { quantity, .. } => {
                Some(*quantity)
            }
            _ => None,
        }
    }

    pub fn price_per_share(&self) -> Option<Decimal> {
        match self {
            TransactionKind::Buy {
                price_per_share, ..
            }
            | TransactionKind::Sell {
                price_per_share, ..
            } => Some(*price_per_share),
            _ => None,
        }
    }
}

/// One ledger-mutating operation, recorded at commit time and never
/// changed afterwards.
///
/// `resulting_cash_balance` and `resulting_holdings` snapshot the
/// post-transaction state redundantly, so a replay of the log can be
/// verified against the records without recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    /// Signed total effect on cash: positive inflow, negative outflow.
    pub amount: Decimal,
    pub resulting_cash_balance: Decimal,
    pub resulting_holdings: BTreeMap<String, u64>,
}

impl Transaction {
    /// Replay this transaction's effect onto an accumulator.
    ///
    /// Folding every transaction over `(0, {})` in log order reproduces the
    /// live account state.
    pub fn apply_to(&self, cash: &mut Decimal, holdings: &mut BTreeMap<String, u64>) {
        *cash += self.amount;
        match &self.kind {
            TransactionKind::Deposit | TransactionKind::Withdrawal => {}
            TransactionKind::Buy {
                symbol, quantity, ..
            } => {
                *holdings.entry(symbol.clone()).or_insert(0) += quantity;
            }
            TransactionKind::Sell {
                symbol, quantity, ..
            } => {
                if let Some(held) = holdings.get_mut(symbol) {
                    *held = held.saturating_sub(*quantity);
                    if *held == 0 {
                        holdings.remove(symbol);
                    }
                }
            }
        }
    }
}
