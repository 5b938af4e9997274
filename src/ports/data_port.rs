//! Price data access port trait.

use crate::domain::error::SimError;
use crate::domain::prices::PriceTable;
use chrono::NaiveDate;

/// Source of the immutable price table a simulation reads.
///
/// Loading happens once, up front; `advance` never touches a port.
pub trait PriceDataPort {
    /// Load prices, optionally restricted to a date range (inclusive).
    fn load_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceTable, SimError>;

    fn list_symbols(&self) -> Result<Vec<String>, SimError>;
}
