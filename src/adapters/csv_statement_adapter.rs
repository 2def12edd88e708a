//! CSV statement writer adapter.

use std::path::Path;

use crate::domain::account::Account;
use crate::domain::error::TradebookError;
use crate::ports::statement_port::StatementPort;

/// Writes the transaction log as a CSV statement, one row per transaction
/// in chronological order.
pub struct CsvStatementAdapter;

impl CsvStatementAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvStatementAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementPort for CsvStatementAdapter {
    fn write(&self, account: &Account, output_path: &Path) -> Result<(), TradebookError> {
        let mut writer =
            csv::Writer::from_path(output_path).map_err(|e| TradebookError::Statement {
                reason: format!("failed to create {}: {}", output_path.display(), e),
            })?;

        writer
            .write_record([
                "timestamp",
                "type",
                "symbol",
                "quantity",
                "price_per_share",
                "amount",
                "cash_balance",
            ])
            .map_err(|e| TradebookError::Statement {
                reason: format!("failed to write header: {e}"),
            })?;

        for tx in &account.transactions {
            writer
                .write_record([
                    tx.timestamp.to_rfc3339(),
                    tx.kind.label().to_string(),
                    tx.kind.symbol().unwrap_or_default().to_string(),
                    tx.kind
                        .quantity()
                        .map(|q| q.to_string())
                        .unwrap_or_default(),
                    tx.kind
                        .price_per_share()
                        .map(|p| p.to_string())
                        .unwrap_or_default(),
                    tx.amount.to_string(),
                    tx.resulting_cash_balance.to_string(),
                ])
                .map_err(|e| TradebookError::Statement {
                    reason: format!("failed to write transaction row: {e}"),
                })?;
        }

        writer.flush()?;
        Ok(())
    }
}
