//! Persisted bot record: the serialized form of a simulated portfolio.
//!
//! A record carries everything the comparison tooling needs. Metrics are
//! recomputed from the embedded ledgers, so a reloaded record reproduces the
//! exact figures of the live portfolio it was taken from (JSON round-trips
//! `f64` losslessly).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::metrics;
use crate::domain::money::round2;
use crate::domain::trade_log::TradeRecord;

/// One date-indexed ledger (holdings or values), column-ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub symbols: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<f64>>,
}

impl LedgerSnapshot {
    pub fn row_totals(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.iter().sum()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotRecord {
    pub name: String,
    pub start_date: NaiveDate,
    pub start_value: f64,
    pub strategy_description: String,
    pub initial_allocation: Vec<(String, f64)>,
    pub final_roi: f64,
    pub final_volatility: f64,
    pub holdings: LedgerSnapshot,
    pub values: LedgerSnapshot,
    pub trade_log: Vec<TradeRecord>,
}

impl BotRecord {
    /// Latest total value, rounded to cents.
    pub fn valuate(&self) -> f64 {
        let totals = self.values.row_totals();
        totals.last().map(|v| round2(*v)).unwrap_or(0.0)
    }

    /// Per-day total value, each rounded to cents.
    pub fn value_history(&self) -> Vec<(NaiveDate, f64)> {
        self.values
            .dates
            .iter()
            .zip(self.values.row_totals())
            .map(|(date, total)| (*date, round2(total)))
            .collect()
    }

    pub fn days_held(&self) -> usize {
        self.holdings.dates.len()
    }

    pub fn total_return(&self) -> f64 {
        round2(self.valuate() - self.start_value)
    }

    /// Annualized return in percent, recomputed from the values ledger.
    pub fn roi(&self) -> f64 {
        let totals = self.values.row_totals();
        let final_value = totals.last().copied().unwrap_or(self.start_value);
        round2(metrics::annualized_return(
            self.start_value,
            final_value,
            self.days_held(),
        ))
    }

    /// Volatility in percent, recomputed from the values ledger.
    pub fn volatility(&self) -> f64 {
        let totals: Vec<f64> = self.value_history().iter().map(|(_, v)| *v).collect();
        metrics::volatility(&totals)
    }
}
