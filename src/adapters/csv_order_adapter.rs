//! CSV order-script reader adapter.
//!
//! Order scripts drive a session from a file: one row per operation,
//! columns `op,symbol,quantity,amount`. Cash operations fill `amount`,
//! trades fill `symbol` and `quantity`.

use rust_decimal::Decimal;
use std::path::Path;

use crate::domain::error::TradebookError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOp {
    Deposit,
    Withdraw,
    Buy,
    Sell,
}

impl OrderOp {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "deposit" => Some(OrderOp::Deposit),
            "withdraw" => Some(OrderOp::Withdraw),
            "buy" => Some(OrderOp::Buy),
            "sell" => Some(OrderOp::Sell),
            _ => None,
        }
    }
}

/// One parsed order-script row. Field presence is checked by the CLI when
/// it dispatches, so a row missing its amount still parses here.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderInstruction {
    pub op: OrderOp,
    pub symbol: Option<String>,
    pub quantity: Option<i64>,
    pub amount: Option<Decimal>,
}

pub fn read_orders(path: &Path) -> Result<Vec<OrderInstruction>, TradebookError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| TradebookError::Statement {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut orders = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let line = index + 2; // header is line 1
        let record = result.map_err(|e| TradebookError::Statement {
            reason: format!("CSV parse error on line {line}: {e}"),
        })?;

        let op_field = record.get(0).unwrap_or("").trim();
        let op = OrderOp::parse(op_field).ok_or_else(|| TradebookError::Statement {
            reason: format!(
                "unknown op {op_field:?} on line {line}, expected deposit/withdraw/buy/sell"
            ),
        })?;

        let symbol = record
            .get(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let quantity = match record.get(2).map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| TradebookError::Statement {
                reason: format!("invalid quantity {raw:?} on line {line}"),
            })?),
            None => None,
        };

        let amount = match record.get(3).map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                Some(
                    raw.parse::<Decimal>()
                        .map_err(|_| TradebookError::Statement {
                            reason: format!("invalid amount {raw:?} on line {line}"),
                        })?,
                )
            }
            None => None,
        };

        orders.push(OrderInstruction {
            op,
            symbol,
            quantity,
            amount,
        });
    }
    Ok(orders)
}
