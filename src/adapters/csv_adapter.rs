//! CSV price table adapter.
//!
//! Reads the wide price file the data collaborator maintains: a `Date`
//! column plus one adjusted-close column per symbol. The reserved cash
//! column is appended at 1 when the file does not carry it.

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::SimError;
use crate::domain::prices::{CASH_SYMBOL, PriceTable};
use crate::ports::data_port::PriceDataPort;

pub struct CsvPriceAdapter {
    path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_content(&self) -> Result<String, SimError> {
        fs::read_to_string(&self.path).map_err(|e| SimError::PriceData {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })
    }

    fn parse_symbols(headers: &csv::StringRecord) -> Result<Vec<String>, SimError> {
        match headers.get(0) {
            Some("Date") => {}
            other => {
                return Err(SimError::PriceData {
                    reason: format!(
                        "expected Date as first column, found {}",
                        other.unwrap_or("nothing")
                    ),
                });
            }
        }
        Ok(headers.iter().skip(1).map(str::to_string).collect())
    }
}

impl PriceDataPort for CsvPriceAdapter {
    fn load_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceTable, SimError> {
        let content = self.read_content()?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| SimError::PriceData {
                reason: format!("CSV parse error: {e}"),
            })?
            .clone();
        let mut symbols = Self::parse_symbols(&headers)?;
        let has_cash = symbols.iter().any(|s| s == CASH_SYMBOL);

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SimError::PriceData {
                reason: format!("CSV parse error: {e}"),
            })?;

            let date_str = record.get(0).ok_or_else(|| SimError::PriceData {
                reason: "missing date column".into(),
            })?;
            let date =
                NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| SimError::PriceData {
                    reason: format!("invalid date {date_str}: {e}"),
                })?;

            if start_date.is_some_and(|start| date < start)
                || end_date.is_some_and(|end| date > end)
            {
                continue;
            }

            let mut row = Vec::with_capacity(symbols.len() + 1);
            for (i, symbol) in symbols.iter().enumerate() {
                let cell = record.get(i + 1).ok_or_else(|| SimError::PriceData {
                    reason: format!("missing {symbol} value on {date}"),
                })?;
                let price: f64 = cell.trim().parse().map_err(|_| SimError::PriceData {
                    reason: format!("invalid {symbol} value on {date}: {cell}"),
                })?;
                row.push(price);
            }
            if !has_cash {
                row.push(1.0);
            }
            rows.push((date, row));
        }

        if !has_cash {
            symbols.push(CASH_SYMBOL.to_string());
        }
        rows.sort_by_key(|(date, _)| *date);

        PriceTable::new(symbols, rows)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SimError> {
        let content = self.read_content()?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| SimError::PriceData {
                reason: format!("CSV parse error: {e}"),
            })?
            .clone();
        Self::parse_symbols(&headers)
    }
}
