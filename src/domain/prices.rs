//! Date-indexed price table, shared read-only across portfolios.
//!
//! One row per calendar day, one column per asset symbol, plus the reserved
//! cash column fixed at 1. Portfolios never mutate the table; they fail fast
//! with [`SimError::DataGap`] when a date they need is not resident.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::error::SimError;

/// Reserved cash column, always valued 1.
pub const CASH_SYMBOL: &str = "USD";

#[derive(Debug, Clone)]
pub struct PriceTable {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
    date_index: HashMap<NaiveDate, usize>,
    symbol_index: HashMap<String, usize>,
}

impl PriceTable {
    /// Build a table from a column list and dated rows.
    ///
    /// Rows must be in strictly increasing date order with no duplicates, and
    /// every row must be as wide as the column list. The cash column must be
    /// present.
    pub fn new(symbols: Vec<String>, dated_rows: Vec<(NaiveDate, Vec<f64>)>) -> Result<Self, SimError> {
        if dated_rows.is_empty() {
            return Err(SimError::PriceData {
                reason: "price table has no rows".into(),
            });
        }

        let mut symbol_index = HashMap::new();
        for (i, symbol) in symbols.iter().enumerate() {
            if symbol_index.insert(symbol.clone(), i).is_some() {
                return Err(SimError::PriceData {
                    reason: format!("duplicate symbol column {symbol}"),
                });
            }
        }
        if !symbol_index.contains_key(CASH_SYMBOL) {
            return Err(SimError::PriceData {
                reason: format!("missing reserved cash column {CASH_SYMBOL}"),
            });
        }

        let mut dates = Vec::with_capacity(dated_rows.len());
        let mut rows = Vec::with_capacity(dated_rows.len());
        let mut date_index = HashMap::new();

        for (date, row) in dated_rows {
            if row.len() != symbols.len() {
                return Err(SimError::PriceData {
                    reason: format!(
                        "row for {date} has {} values, expected {}",
                        row.len(),
                        symbols.len()
                    ),
                });
            }
            if let Some(&last) = dates.last() {
                if date <= last {
                    return Err(SimError::PriceData {
                        reason: format!("dates not strictly increasing at {date}"),
                    });
                }
            }
            date_index.insert(date, dates.len());
            dates.push(date);
            rows.push(row);
        }

        Ok(Self {
            symbols,
            dates,
            rows,
            date_index,
            symbol_index,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn day_count(&self) -> usize {
        self.dates.len()
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbol_index.contains_key(symbol)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.date_index.contains_key(&date)
    }

    /// Price of `symbol` on `date`, or `None` when either is not in the table.
    pub fn price(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        let row = *self.date_index.get(&date)?;
        let col = *self.symbol_index.get(symbol)?;
        Some(self.rows[row][col])
    }

    /// Price of `symbol` at `days_back` rows before `date`.
    ///
    /// `None` when the lookback reaches before the first row; rolling-window
    /// signals treat that as a failed comparison rather than an error.
    pub fn lookback(&self, date: NaiveDate, symbol: &str, days_back: usize) -> Option<f64> {
        let row = *self.date_index.get(&date)?;
        let col = *self.symbol_index.get(symbol)?;
        row.checked_sub(days_back).map(|r| self.rows[r][col])
    }
}
