//! Point-in-time reconstruction from the transaction log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::error::TradebookError;
use super::response::Response;
use super::store::AccountStore;
use super::valuation::{value_holdings, ValuationRow};
use crate::ports::price_port::PricePort;

/// Account state reconstructed by replaying the log up to a cutoff.
///
/// `transactions_applied == 0` is the designated "no activity before this
/// time" empty state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSnapshot {
    pub as_of: DateTime<Utc>,
    pub cash_balance: Decimal,
    pub holdings: BTreeMap<String, u64>,
    pub transactions_applied: usize,
}

/// A reconstructed state valued at *current* oracle prices. No historical
/// price series exists anywhere in the system, so past holdings are marked
/// to today's quotes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotValuation {
    pub snapshot: AccountSnapshot,
    pub rows: Vec<ValuationRow>,
    pub holdings_value: Decimal,
    pub portfolio_value: Decimal,
    pub partial: bool,
}

/// Read-only history queries. Only the immutable transaction log is
/// consulted; the live mutable fields are never touched.
pub struct HistoryService<'a> {
    store: &'a AccountStore,
    prices: &'a dyn PricePort,
}

impl<'a> HistoryService<'a> {
    pub fn new(store: &'a AccountStore, prices: &'a dyn PricePort) -> Self {
        Self { store, prices }
    }

    pub fn snapshot_at(&self, at: DateTime<Utc>) -> Response<AccountSnapshot> {
        Response::from_result(self.try_snapshot_at(at), |snapshot| {
            if snapshot.transactions_applied == 0 {
                format!("no activity before {}", snapshot.as_of)
            } else {
                format!(
                    "state at {}: cash {}, {} holding(s), {} transaction(s) applied",
                    snapshot.as_of,
                    snapshot.cash_balance,
                    snapshot.holdings.len(),
                    snapshot.transactions_applied
                )
            }
        })
    }

    /// Fold the log over a fresh accumulator, stopping after the last
    /// transaction with `timestamp <= at`.
    pub fn try_snapshot_at(&self, at: DateTime<Utc>) -> Result<AccountSnapshot, TradebookError> {
        let (opened_at, transactions) = self
            .store
            .read(|account| (account.opened_at, account.transactions.clone()))?;

        let now = Utc::now();
        if at < opened_at || at > now {
            return Err(TradebookError::OutOfRange {
                requested: at,
                opened: opened_at,
                now,
            });
        }

        let mut cash = Decimal::ZERO;
        let mut holdings = BTreeMap::new();
        let mut applied = 0;
        for tx in transactions.iter().take_while(|tx| tx.timestamp <= at) {
            tx.apply_to(&mut cash, &mut holdings);
            applied += 1;
        }

        Ok(AccountSnapshot {
            as_of: at,
            cash_balance: cash,
            holdings,
            transactions_applied: applied,
        })
    }

    pub fn valuation_at(&self, at: DateTime<Utc>) -> Response<SnapshotValuation> {
        Response::from_result(self.try_valuation_at(at), |report| {
            let mut message = format!(
                "portfolio value {} at {} (cash {}, holdings {})",
                report.portfolio_value,
                report.snapshot.as_of,
                report.snapshot.cash_balance,
                report.holdings_value
            );
            if report.partial {
                message.push_str("; totals are partial, some prices unavailable");
            }
            message
        })
    }

    pub fn try_valuation_at(
        &self,
        at: DateTime<Utc>,
    ) -> Result<SnapshotValuation, TradebookError> {
        let snapshot = self.try_snapshot_at(at)?;
        let (rows, holdings_value, partial) = value_holdings(&snapshot.holdings, self.prices);
        let portfolio_value = snapshot.cash_balance + holdings_value;
        Ok(SnapshotValuation {
            snapshot,
            rows,
            holdings_value,
            portfolio_value,
            partial,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed_price_adapter::FixedPriceAdapter;
    use crate::domain::money::MoneyService;
    use crate::domain::trading::TradingService;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn setup() -> (AccountStore, FixedPriceAdapter) {
        let store = AccountStore::new();
        store.open(dec!(1500)).unwrap();
        let prices = FixedPriceAdapter::new().with_quote("AAPL", dec!(100));
        (store, prices)
    }

    #[test]
    fn snapshot_at_now_equals_live_state() {
        let (store, prices) = setup();
        let trading = TradingService::new(&store, &prices);
        let money = MoneyService::new(&store);
        trading.try_buy("AAPL", 10).unwrap();
        money.try_deposit(dec!(200)).unwrap();

        let history = HistoryService::new(&store, &prices);
        let snapshot = history.try_snapshot_at(Utc::now()).unwrap();
        let account = store.snapshot().unwrap();

        assert_eq!(snapshot.cash_balance, account.cash_balance);
        assert_eq!(snapshot.holdings, account.holdings);
        assert_eq!(snapshot.transactions_applied, account.transactions.len());
    }

    #[test]
    fn cutoff_before_later_transactions_excludes_them() {
        let (store, prices) = setup();
        let trading = TradingService::new(&store, &prices);

        std::thread::sleep(std::time::Duration::from_millis(2));
        let before_trade = Utc::now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        trading.try_buy("AAPL", 10).unwrap();

        let history = HistoryService::new(&store, &prices);
        let snapshot = history.try_snapshot_at(before_trade).unwrap();

        assert_eq!(snapshot.transactions_applied, 1);
        assert_eq!(snapshot.cash_balance, dec!(1500));
        assert!(snapshot.holdings.is_empty());
    }

    #[test]
    fn before_creation_is_out_of_range() {
        let (store, prices) = setup();
        let history = HistoryService::new(&store, &prices);

        let opened_at = store.read(|account| account.opened_at).unwrap();
        let err = history
            .try_snapshot_at(opened_at - Duration::seconds(1))
            .unwrap_err();
        assert!(matches!(err, TradebookError::OutOfRange { .. }));
    }

    #[test]
    fn future_timestamp_is_out_of_range() {
        let (store, prices) = setup();
        let history = HistoryService::new(&store, &prices);

        let err = history
            .try_snapshot_at(Utc::now() + Duration::days(1))
            .unwrap_err();
        assert!(matches!(err, TradebookError::OutOfRange { .. }));
    }

    #[test]
    fn creation_instant_includes_the_opening_deposit() {
        let (store, prices) = setup();
        let history = HistoryService::new(&store, &prices);

        let opened_at = store.read(|account| account.opened_at).unwrap();
        let snapshot = history.try_snapshot_at(opened_at).unwrap();
        assert_eq!(snapshot.transactions_applied, 1);
        assert_eq!(snapshot.cash_balance, dec!(1500));
    }

    #[test]
    fn valuation_at_uses_current_prices_for_past_holdings() {
        let (store, prices) = setup();
        let trading = TradingService::new(&store, &prices);
        trading.try_buy("AAPL", 10).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let after_trade = Utc::now();

        // The oracle has moved since the trade; the snapshot is valued at
        // the new quote.
        let repriced = FixedPriceAdapter::new().with_quote("AAPL", dec!(150));
        let history = HistoryService::new(&store, &repriced);
        let report = history.try_valuation_at(after_trade).unwrap();

        assert_eq!(report.holdings_value, dec!(1500));
        assert_eq!(report.portfolio_value, dec!(2000));
        assert!(!report.partial);
    }

    #[test]
    fn snapshot_envelope_describes_no_activity() {
        let (store, prices) = setup();
        let history = HistoryService::new(&store, &prices);

        let resp = history.snapshot_at(Utc::now());
        assert!(resp.success);
        let snapshot = resp.data.unwrap();
        assert_eq!(snapshot.transactions_applied, 1);
    }
}
