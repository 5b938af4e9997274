//! Asset universe parsing and validation.
//!
//! Symbol lists and allocation splits come from configuration as
//! comma-separated strings; their order is preserved, since it fixes the
//! strategy's candidate evaluation order.

use crate::domain::error::SimError;
use crate::domain::prices::PriceTable;
use std::collections::HashSet;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("malformed split entry: {0}")]
    MalformedSplit(String),

    #[error("no symbols left after validation")]
    AllSymbolsMissing,
}

impl From<UniverseError> for SimError {
    fn from(err: UniverseError) -> Self {
        SimError::AllocationInvalid {
            reason: err.to_string(),
        }
    }
}

/// Parse a comma-separated symbol list, e.g. `BTC-USD,ETH-USD`.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if seen.contains(&symbol) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        seen.insert(symbol.clone());
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Parse an allocation split, e.g. `BTC-USD:0.5,ETH-USD:0.5`.
///
/// Fraction-sum checks belong to the portfolio; this only parses shape.
pub fn parse_split(input: &str) -> Result<Vec<(String, f64)>, UniverseError> {
    let mut split = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let (symbol, fraction) = trimmed
            .split_once(':')
            .ok_or_else(|| UniverseError::MalformedSplit(trimmed.to_string()))?;
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        if seen.contains(&symbol) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        let fraction: f64 = fraction
            .trim()
            .parse()
            .map_err(|_| UniverseError::MalformedSplit(trimmed.to_string()))?;
        seen.insert(symbol.clone());
        split.push((symbol, fraction));
    }

    Ok(split)
}

/// Symbols dropped because the price table does not carry them.
#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
}

pub struct UniverseValidationResult {
    pub symbols: Vec<String>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Keep the symbols the price table knows, warn about the rest.
///
/// Errors only when nothing survives; a partially-known list proceeds so one
/// delisted token does not kill a whole simulation.
pub fn validate_universe(
    prices: &PriceTable,
    symbols: Vec<String>,
) -> Result<UniverseValidationResult, SimError> {
    let mut valid = Vec::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        if prices.contains_symbol(&symbol) {
            valid.push(symbol);
        } else {
            eprintln!("Warning: skipping {symbol} (not in price table)");
            skipped.push(SkippedSymbol { symbol });
        }
    }

    if valid.is_empty() {
        return Err(UniverseError::AllSymbolsMissing.into());
    }

    if !skipped.is_empty() {
        eprintln!(
            "Simulating {} of {} requested symbols",
            valid.len(),
            valid.len() + skipped.len()
        );
    }

    Ok(UniverseValidationResult {
        symbols: valid,
        skipped,
    })
}
