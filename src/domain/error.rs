//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for botsim.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
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

    #[error("invalid initial allocation: {reason}")]
    AllocationInvalid { reason: String },

    #[error("invalid strategy: {reason}")]
    StrategyInvalid { reason: String },

    #[error("no price for {symbol} on {date}")]
    DataGap { symbol: String, date: NaiveDate },

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error("unknown symbol {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("no ledger row for {date}")]
    LedgerDate { date: NaiveDate },

    #[error("bot store error: {reason}")]
    Store { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SimError> for std::process::ExitCode {
    fn from(err: &SimError) -> Self {
        let code: u8 = match err {
            SimError::Io(_) => 1,
            SimError::ConfigParse { .. }
            | SimError::ConfigMissing { .. }
            | SimError::ConfigInvalid { .. } => 2,
            SimError::AllocationInvalid { .. } | SimError::StrategyInvalid { .. } => 3,
            SimError::DataGap { .. }
            | SimError::PriceData { .. }
            | SimError::UnknownSymbol { .. }
            | SimError::LedgerDate { .. } => 4,
            SimError::Store { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

/// Cause of a rejected (but non-fatal) trade intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectKind {
    InsufficientCash,
}

/// Typed counts of rejected trades, kept by the portfolio across a simulation.
///
/// A rejected buy is a deliberate greedy-strategy outcome, not a fault: the
/// intent is dropped, the count bumped, and the simulation continues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionTally {
    insufficient_cash: u64,
}

impl RejectionTally {
    pub fn record(&mut self, kind: RejectKind) {
        match kind {
            RejectKind::InsufficientCash => self.insufficient_cash += 1,
        }
    }

    pub fn count(&self, kind: RejectKind) -> u64 {
        match kind {
            RejectKind::InsufficientCash => self.insufficient_cash,
        }
    }

    pub fn total(&self) -> u64 {
        self.insufficient_cash
    }
}
