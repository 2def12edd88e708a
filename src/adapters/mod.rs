//! Concrete adapter implementations for ports.

pub mod fixed_price_adapter;
pub mod file_config_adapter;
pub mod csv_statement_adapter;
pub mod csv_order_adapter;
