//! Domain error types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Top-level error type for tradebook.
///
/// Every variant except [`Internal`](TradebookError::Internal) is an
/// expected, recoverable rejection; none of them leave a partial mutation
/// behind. Display strings are stable per kind so callers may assert on
/// exact wording.
#[derive(Debug, thiserror::Error)]
pub enum TradebookError {
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient shares of {symbol}: requested {requested}, held {held}")]
    InsufficientShares {
        symbol: String,
        requested: u64,
        held: u64,
    },

    #[error("no price available for {symbol}")]
    PriceUnavailable { symbol: String },

    #[error("account already initialized")]
    AlreadyInitialized,

    #[error("account not initialized")]
    NotInitialized,

    #[error("timestamp {requested} is outside the account's window ({opened} to {now})")]
    OutOfRange {
        requested: DateTime<Utc>,
        opened: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("internal error, try again later: {reason}")]
    Internal { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("statement error: {reason}")]
    Statement { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradebookError {
    /// Machine-readable code for the response envelope, so a presentation
    /// layer can pick its treatment without string-matching the message.
    pub fn code(&self) -> &'static str {
        match self {
            TradebookError::InvalidAmount { .. } => "INVALID_AMOUNT",
            TradebookError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            TradebookError::InsufficientShares { .. } => "INSUFFICIENT_SHARES",
            TradebookError::PriceUnavailable { .. } => "PRICE_UNAVAILABLE",
            TradebookError::AlreadyInitialized => "ALREADY_INITIALIZED",
            TradebookError::NotInitialized => "NOT_INITIALIZED",
            TradebookError::OutOfRange { .. } => "OUT_OF_RANGE",
            TradebookError::Internal { .. } => "INTERNAL",
            TradebookError::ConfigParse { .. } => "CONFIG_PARSE",
            TradebookError::ConfigMissing { .. } => "CONFIG_MISSING",
            TradebookError::ConfigInvalid { .. } => "CONFIG_INVALID",
            TradebookError::Statement { .. } => "STATEMENT",
            TradebookError::Io(_) => "IO",
        }
    }
}

impl From<&TradebookError> for std::process::ExitCode {
    fn from(err: &TradebookError) -> Self {
        let code: u8 = match err {
            TradebookError::Io(_) => 1,
            TradebookError::ConfigParse { .. }
            | TradebookError::ConfigMissing { .. }
            | TradebookError::ConfigInvalid { .. } => 2,
            TradebookError::InvalidAmount { .. }
            | TradebookError::InsufficientFunds { .. }
            | TradebookError::InsufficientShares { .. }
            | TradebookError::PriceUnavailable { .. }
            | TradebookError::OutOfRange { .. } => 3,
            TradebookError::AlreadyInitialized | TradebookError::NotInitialized => 4,
            TradebookError::Internal { .. } | TradebookError::Statement { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
