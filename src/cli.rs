//! CLI definition and dispatch.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_order_adapter::{read_orders, OrderInstruction, OrderOp};
use crate::adapters::csv_statement_adapter::CsvStatementAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fixed_price_adapter::FixedPriceAdapter;
use crate::domain::config_validation::{validate_account_config, validate_price_config};
use crate::domain::error::TradebookError;
use crate::domain::history::HistoryService;
use crate::domain::money::MoneyService;
use crate::domain::response::Response;
use crate::domain::store::AccountStore;
use crate::domain::trading::TradingService;
use crate::domain::transaction::Transaction;
use crate::domain::valuation::{BaselinePolicy, ValuationService};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::statement_port::StatementPort;

#[derive(Parser, Debug)]
#[command(name = "tradebook", about = "Single-account trading ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay an order script against a fresh account
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        orders: PathBuf,
        /// Write the final transaction log to this CSV file
        #[arg(short, long)]
        statement: Option<PathBuf>,
        /// Also report the reconstructed state at this RFC 3339 instant
        #[arg(long)]
        as_of: Option<String>,
        /// Print envelopes as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Validate a session configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Look up a symbol's price through the oracle
    Quote {
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            orders,
            statement,
            as_of,
            json,
        } => run_session(&config, &orders, statement.as_ref(), as_of.as_deref(), json),
        Command::Validate { config } => run_validate(&config),
        Command::Quote { symbol, config } => run_quote(&symbol, config.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TradebookError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_session(
    config_path: &PathBuf,
    orders_path: &PathBuf,
    statement_path: Option<&PathBuf>,
    as_of: Option<&str>,
    json: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_account_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_price_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Resolve the as-of cutoff up front so a typo fails fast
    let as_of = match as_of {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(_) => {
                eprintln!("error: invalid --as-of timestamp (expected RFC 3339)");
                return ExitCode::from(2);
            }
        },
        None => None,
    };

    // Stage 3: Build the oracle and load the order script
    let prices = match FixedPriceAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let orders = match read_orders(orders_path) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Open the account
    let opening_balance = match adapter.get_decimal("account", "opening_balance") {
        Some(balance) => balance,
        None => {
            eprintln!("error: missing [account] opening_balance");
            return ExitCode::from(2);
        }
    };
    let store = AccountStore::new();
    if let Err(e) = store.open(opening_balance) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!(
        "Opened account with {} and {} quoted symbol(s)",
        opening_balance,
        prices.symbols().len()
    );

    // Stage 5: Replay the script; rejections are session output, not errors
    let policy = adapter
        .get_string("valuation", "baseline")
        .and_then(|name| BaselinePolicy::from_name(&name))
        .unwrap_or_default();
    let money = MoneyService::new(&store);
    let trading = TradingService::new(&store, &prices);
    let valuation = ValuationService::with_policy(&store, &prices, policy);
    let history = HistoryService::new(&store, &prices);

    eprintln!("Replaying {} order(s)", orders.len());
    for order in &orders {
        let response = dispatch_order(order, &money, &trading);
        emit(&response, json);
    }

    // Stage 6: Summary
    emit(&valuation.current_value(), json);
    emit(&valuation.profit_loss(), json);
    if let Some(at) = as_of {
        emit(&history.valuation_at(at), json);
    }

    // Stage 7: Optional statement export
    if let Some(path) = statement_path {
        let account = match store.snapshot() {
            Ok(a) => a,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        if let Err(e) = CsvStatementAdapter::new().write(&account, path) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Statement written to {}", path.display());
    }

    ExitCode::SUCCESS
}

fn dispatch_order(
    order: &OrderInstruction,
    money: &MoneyService,
    trading: &TradingService,
) -> Response<Transaction> {
    match order.op {
        OrderOp::Deposit => match order.amount {
            Some(amount) => money.deposit(amount),
            None => missing_field("deposit", "an amount"),
        },
        OrderOp::Withdraw => match order.amount {
            Some(amount) => money.withdraw(amount),
            None => missing_field("withdraw", "an amount"),
        },
        OrderOp::Buy => match (&order.symbol, order.quantity) {
            (Some(symbol), Some(quantity)) => trading.buy(symbol, quantity),
            _ => missing_field("buy", "a symbol and quantity"),
        },
        OrderOp::Sell => match (&order.symbol, order.quantity) {
            (Some(symbol), Some(quantity)) => trading.sell(symbol, quantity),
            _ => missing_field("sell", "a symbol and quantity"),
        },
    }
}

fn missing_field(op: &str, field: &str) -> Response<Transaction> {
    Response::failure(&TradebookError::InvalidAmount {
        reason: format!("{op} requires {field}"),
    })
}

fn emit<T: Serialize>(response: &Response<T>, json: bool) {
    if json {
        match serde_json::to_string(response) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("error: failed to encode response: {e}"),
        }
    } else if response.success {
        println!("ok: {}", response.message);
    } else {
        println!(
            "rejected [{}]: {}",
            response.error_code.as_deref().unwrap_or("UNKNOWN"),
            response.message
        );
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_account_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_price_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    println!("config is valid");
    ExitCode::SUCCESS
}

fn run_quote(symbol: &str, config_path: Option<&PathBuf>) -> ExitCode {
    let prices = match config_path {
        Some(path) => {
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            match FixedPriceAdapter::from_config(&adapter) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            }
        }
        None => FixedPriceAdapter::default(),
    };

    match prices.get_price(symbol) {
        Ok(price) => {
            println!("{}: {}", symbol.trim().to_uppercase(), price);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
