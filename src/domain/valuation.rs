//! Portfolio valuation and profit/loss.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::error::TradebookError;
use super::response::Response;
use super::store::AccountStore;
use crate::ports::price_port::PricePort;

/// Which reference capital figure profit/loss is measured against.
///
/// A policy choice, not a constant: the default nets withdrawals against
/// deposits, the alternative counts deposits alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BaselinePolicy {
    NetContributions,
    GrossDeposits,
}

impl Default for BaselinePolicy {
    fn default() -> Self {
        BaselinePolicy::NetContributions
    }
}

impl BaselinePolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "net_contributions" => Some(BaselinePolicy::NetContributions),
            "gross_deposits" => Some(BaselinePolicy::GrossDeposits),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BaselinePolicy::NetContributions => "net_contributions",
            BaselinePolicy::GrossDeposits => "gross_deposits",
        }
    }

    fn baseline(&self, total_deposits: Decimal, total_withdrawals: Decimal) -> Decimal {
        match self {
            BaselinePolicy::NetContributions => total_deposits - total_withdrawals,
            BaselinePolicy::GrossDeposits => total_deposits,
        }
    }
}

/// One held symbol's contribution to the portfolio value. `price` and
/// `market_value` are `None` when the oracle has no quote; such rows are
/// excluded from the totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationRow {
    pub symbol: String,
    pub quantity: u64,
    pub price: Option<Decimal>,
    pub market_value: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub cash_balance: Decimal,
    pub rows: Vec<ValuationRow>,
    pub holdings_value: Decimal,
    pub portfolio_value: Decimal,
    /// True when at least one row had no quote, making the totals partial.
    pub partial: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Profit,
    Loss,
    BreakEven,
}

/// Profit/loss against the configured baseline, or `NoBaseline` when no
/// net capital was contributed and the figure would be meaningless.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ProfitLoss {
    NoBaseline,
    Measured {
        baseline: Decimal,
        portfolio_value: Decimal,
        profit_loss: Decimal,
        outcome: Outcome,
        partial: bool,
    },
}

/// Read-only valuation over the account store and price oracle.
pub struct ValuationService<'a> {
    store: &'a AccountStore,
    prices: &'a dyn PricePort,
    policy: BaselinePolicy,
}

impl<'a> ValuationService<'a> {
    pub fn new(store: &'a AccountStore, prices: &'a dyn PricePort) -> Self {
        Self::with_policy(store, prices, BaselinePolicy::default())
    }

    pub fn with_policy(
        store: &'a AccountStore,
        prices: &'a dyn PricePort,
        policy: BaselinePolicy,
    ) -> Self {
        Self {
            store,
            prices,
            policy,
        }
    }

    pub fn policy(&self) -> BaselinePolicy {
        self.policy
    }

    pub fn current_value(&self) -> Response<ValuationReport> {
        Response::from_result(self.try_current_value(), |report| {
            let mut message = format!(
                "portfolio value {} (cash {}, holdings {})",
                report.portfolio_value, report.cash_balance, report.holdings_value
            );
            if report.partial {
                message.push_str("; totals are partial, some prices unavailable");
            }
            message
        })
    }

    pub fn try_current_value(&self) -> Result<ValuationReport, TradebookError> {
        // Clone state out under the read lock; oracle calls happen with no
        // lock held.
        let (cash_balance, holdings) = self
            .store
            .read(|account| (account.cash_balance, account.holdings.clone()))?;

        let (rows, holdings_value, partial) = value_holdings(&holdings, self.prices);
        Ok(ValuationReport {
            cash_balance,
            portfolio_value: cash_balance + holdings_value,
            rows,
            holdings_value,
            partial,
        })
    }

    pub fn profit_loss(&self) -> Response<ProfitLoss> {
        Response::from_result(self.try_profit_loss(), |report| match report {
            ProfitLoss::NoBaseline => "no baseline: no net capital contributed".to_string(),
            ProfitLoss::Measured {
                baseline,
                profit_loss,
                outcome,
                partial,
                ..
            } => {
                let mut message = match outcome {
                    Outcome::Profit => format!("profit {profit_loss} against baseline {baseline}"),
                    Outcome::Loss => format!("loss {profit_loss} against baseline {baseline}"),
                    Outcome::BreakEven => format!("break-even against baseline {baseline}"),
                };
                if *partial {
                    message.push_str("; totals are partial, some prices unavailable");
                }
                message
            }
        })
    }

    pub fn try_profit_loss(&self) -> Result<ProfitLoss, TradebookError> {
        let (total_deposits, total_withdrawals) = self
            .store
            .read(|account| (account.total_deposits, account.total_withdrawals))?;
        let baseline = self.policy.baseline(total_deposits, total_withdrawals);
        if baseline <= Decimal::ZERO {
            return Ok(ProfitLoss::NoBaseline);
        }

        let valuation = self.try_current_value()?;
        let profit_loss = valuation.portfolio_value - baseline;
        let outcome = if profit_loss > Decimal::ZERO {
            Outcome::Profit
        } else if profit_loss < Decimal::ZERO {
            Outcome::Loss
        } else {
            Outcome::BreakEven
        };
        Ok(ProfitLoss::Measured {
            baseline,
            portfolio_value: valuation.portfolio_value,
            profit_loss,
            outcome,
            partial: valuation.partial,
        })
    }
}

/// Price every holding, excluding unquoted rows from the sum.
pub fn value_holdings(
    holdings: &BTreeMap<String, u64>,
    prices: &dyn PricePort,
) -> (Vec<ValuationRow>, Decimal, bool) {
    let mut rows = Vec::with_capacity(holdings.len());
    let mut total = Decimal::ZERO;
    let mut partial = false;

    for (symbol, &quantity) in holdings {
        match prices.get_price(symbol) {
            Ok(price) => {
                let market_value = price * Decimal::from(quantity);
                total += market_value;
                rows.push(ValuationRow {
                    symbol: symbol.clone(),
                    quantity,
                    price: Some(price),
                    market_value: Some(market_value),
                });
            }
            Err(_) => {
                partial = true;
                rows.push(ValuationRow {
                    symbol: symbol.clone(),
                    quantity,
                    price: None,
                    market_value: None,
                });
            }
        }
    }
    (rows, total, partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed_price_adapter::FixedPriceAdapter;
    use crate::domain::money::MoneyService;
    use crate::domain::trading::TradingService;
    use rust_decimal_macros::dec;

    fn setup() -> (AccountStore, FixedPriceAdapter) {
        let store = AccountStore::new();
        store.open(dec!(1500)).unwrap();
        let prices = FixedPriceAdapter::new()
            .with_quote("AAPL", dec!(100))
            .with_quote("TSLA", dec!(250));
        (store, prices)
    }

    #[test]
    fn empty_holdings_value_is_cash_only() {
        let (store, prices) = setup();
        let valuation = ValuationService::new(&store, &prices);

        let report = valuation.try_current_value().unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(report.holdings_value, dec!(0));
        assert_eq!(report.portfolio_value, dec!(1500));
        assert!(!report.partial);
    }

    #[test]
    fn portfolio_value_is_cash_plus_holdings() {
        let (store, prices) = setup();
        let trading = TradingService::new(&store, &prices);
        trading.try_buy("AAPL", 10).unwrap();

        let valuation = ValuationService::new(&store, &prices);
        let report = valuation.try_current_value().unwrap();

        assert_eq!(report.cash_balance, dec!(500));
        assert_eq!(report.holdings_value, dec!(1000));
        assert_eq!(report.portfolio_value, dec!(1500));
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].market_value, Some(dec!(1000)));
    }

    #[test]
    fn unquoted_holding_marks_report_partial() {
        let (store, prices) = setup();
        let trading = TradingService::new(&store, &prices);
        trading.try_buy("AAPL", 5).unwrap();
        trading.try_buy("TSLA", 2).unwrap();

        // A narrower oracle for the read side: TSLA no longer quoted.
        let stale = FixedPriceAdapter::new().with_quote("AAPL", dec!(100));
        let valuation = ValuationService::new(&store, &stale);
        let report = valuation.try_current_value().unwrap();

        assert!(report.partial);
        assert_eq!(report.holdings_value, dec!(500));
        let tsla = report.rows.iter().find(|r| r.symbol == "TSLA").unwrap();
        assert_eq!(tsla.price, None);
        assert_eq!(tsla.market_value, None);
    }

    #[test]
    fn break_even_when_value_matches_net_contributions() {
        let (store, prices) = setup();
        let money = MoneyService::new(&store);
        let trading = TradingService::new(&store, &prices);

        trading.try_buy("AAPL", 10).unwrap();
        money.try_withdraw(dec!(500)).unwrap();

        // deposits 1500, withdrawals 500, portfolio 0 cash + 10 * 100.
        let valuation = ValuationService::new(&store, &prices);
        match valuation.try_profit_loss().unwrap() {
            ProfitLoss::Measured {
                baseline,
                profit_loss,
                outcome,
                ..
            } => {
                assert_eq!(baseline, dec!(1000));
                assert_eq!(profit_loss, dec!(0));
                assert_eq!(outcome, Outcome::BreakEven);
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[test]
    fn gross_deposits_policy_ignores_withdrawals() {
        let (store, prices) = setup();
        let money = MoneyService::new(&store);
        money.try_withdraw(dec!(500)).unwrap();

        let valuation =
            ValuationService::with_policy(&store, &prices, BaselinePolicy::GrossDeposits);
        match valuation.try_profit_loss().unwrap() {
            ProfitLoss::Measured {
                baseline,
                profit_loss,
                outcome,
                ..
            } => {
                assert_eq!(baseline, dec!(1500));
                assert_eq!(profit_loss, dec!(-500));
                assert_eq!(outcome, Outcome::Loss);
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[test]
    fn withdrawing_everything_leaves_no_baseline() {
        let (store, prices) = setup();
        let money = MoneyService::new(&store);
        money.try_withdraw(dec!(1500)).unwrap();

        let valuation = ValuationService::new(&store, &prices);
        assert_eq!(
            valuation.try_profit_loss().unwrap(),
            ProfitLoss::NoBaseline
        );
    }

    #[test]
    fn policy_names_round_trip() {
        for policy in [BaselinePolicy::NetContributions, BaselinePolicy::GrossDeposits] {
            assert_eq!(BaselinePolicy::from_name(policy.name()), Some(policy));
        }
        assert_eq!(BaselinePolicy::from_name("unknown"), None);
        assert_eq!(
            BaselinePolicy::from_name(" Net_Contributions "),
            Some(BaselinePolicy::NetContributions)
        );
    }

    #[test]
    fn profit_loss_envelope_message_classifies() {
        let (store, prices) = setup();
        let valuation = ValuationService::new(&store, &prices);

        let resp = valuation.profit_loss();
        assert!(resp.success);
        assert_eq!(resp.message, "break-even against baseline 1500");
    }
}
