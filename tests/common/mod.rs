#![allow(dead_code)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tradebook::domain::error::TradebookError;
use tradebook::domain::store::AccountStore;
use tradebook::ports::price_port::PricePort;

pub struct MockPricePort {
    pub quotes: BTreeMap<String, Decimal>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            quotes: BTreeMap::new(),
        }
    }

    pub fn with_quote(mut self, symbol: &str, price: Decimal) -> Self {
        self.quotes.insert(symbol.to_string(), price);
        self
    }

    pub fn without_quote(mut self, symbol: &str) -> Self {
        self.quotes.remove(symbol);
        self
    }
}

impl PricePort for MockPricePort {
    fn get_price(&self, symbol: &str) -> Result<Decimal, TradebookError> {
        self.quotes
            .get(symbol)
            .copied()
            .ok_or_else(|| TradebookError::PriceUnavailable {
                symbol: symbol.to_string(),
            })
    }
}

/// The quotes most tests run against.
pub fn standard_quotes() -> MockPricePort {
    MockPricePort::new()
        .with_quote("AAPL", dec!(100))
        .with_quote("TSLA", dec!(250))
        .with_quote("GOOGL", dec!(2800))
}

pub fn open_store(initial: Decimal) -> AccountStore {
    let store = AccountStore::new();
    store.open(initial).unwrap();
    store
}
