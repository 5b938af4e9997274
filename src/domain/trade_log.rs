//! Append-only audit log of executed trades.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One executed trade.
///
/// `profit` stays `None` until the position closes: buys never carry it, and
/// the closing sell realizes proceeds minus the cash spent on the position
/// since it was last flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub asset: String,
    pub action: TradeAction,
    pub value: f64,
    pub profit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeLog {
    records: Vec<TradeRecord>,
}

impl TradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_buy(&mut self, date: NaiveDate, asset: &str, value: f64) {
        self.records.push(TradeRecord {
            date,
            asset: asset.to_string(),
            action: TradeAction::Buy,
            value,
            profit: None,
        });
    }

    pub fn record_sell(&mut self, date: NaiveDate, asset: &str, value: f64, profit: f64) {
        self.records.push(TradeRecord {
            date,
            asset: asset.to_string(),
            action: TradeAction::Sell,
            value,
            profit: Some(profit),
        });
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<TradeRecord> {
        self.records
    }
}

impl From<Vec<TradeRecord>> for TradeLog {
    fn from(records: Vec<TradeRecord>) -> Self {
        Self { records }
    }
}
