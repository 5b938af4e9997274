//! Portfolio ledgers and the day-by-day simulation loop.
//!
//! A portfolio owns its holdings and values ledgers and a hold-duration map,
//! and holds a read-only reference to the shared price table. Simulation is
//! strictly sequential per portfolio: each day's row derives from the prior
//! day, and within a day every sell resolves before any buy. Distinct
//! portfolios only share the immutable table and may be simulated in
//! parallel.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use crate::domain::error::{RejectKind, RejectionTally, SimError};
use crate::domain::metrics;
use crate::domain::money::{floor_cents, round2};
use crate::domain::prices::{CASH_SYMBOL, PriceTable};
use crate::domain::record::{BotRecord, LedgerSnapshot};
use crate::domain::strategy::{PortfolioState, Strategy};
use crate::domain::trade_log::TradeLog;

const ALLOCATION_TOLERANCE: f64 = 0.01;

/// Result of a buy or sell intent applied to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeOutcome {
    Executed { value: f64 },
    Rejected(RejectKind),
}

pub struct Portfolio<'a> {
    name: String,
    start_date: NaiveDate,
    start_value: f64,
    initial_split: Vec<(String, f64)>,
    /// Ledger columns in configured order, cash included.
    symbols: Vec<String>,
    /// Non-cash columns in ledger order; the strategy's asset universe.
    universe: Vec<String>,
    cash_col: usize,
    dates: Vec<NaiveDate>,
    holdings: Vec<Vec<f64>>,
    values: Vec<Vec<f64>>,
    hold_duration: HashMap<String, u32>,
    /// Cash spent on each open position since it was last flat.
    cost_basis: HashMap<String, f64>,
    rejections: RejectionTally,
    trade_log: TradeLog,
    strategy: Strategy,
    prices: &'a PriceTable,
}

impl<'a> Portfolio<'a> {
    /// Create a portfolio at `start_date` worth `start_value`, split across
    /// assets by fraction.
    ///
    /// Fractions must sum to 1 within 0.01. A cash column is appended at zero
    /// when the split does not mention it. Initial quantity per asset is
    /// `fraction * start_value / price[start_date][asset]`.
    pub fn new(
        name: &str,
        initial_split: &[(String, f64)],
        start_date: NaiveDate,
        start_value: f64,
        prices: &'a PriceTable,
        strategy: Strategy,
    ) -> Result<Self, SimError> {
        validate_split(initial_split)?;
        strategy.validate()?;

        let mut symbols: Vec<String> = initial_split.iter().map(|(s, _)| s.clone()).collect();
        let mut fractions: Vec<f64> = initial_split.iter().map(|(_, f)| *f).collect();
        if !symbols.iter().any(|s| s == CASH_SYMBOL) {
            symbols.push(CASH_SYMBOL.to_string());
            fractions.push(0.0);
        }
        let cash_col = symbols
            .iter()
            .position(|s| s == CASH_SYMBOL)
            .unwrap_or(symbols.len() - 1);

        let mut start_holdings = Vec::with_capacity(symbols.len());
        let mut start_values = Vec::with_capacity(symbols.len());
        let mut cost_basis = HashMap::new();
        for (symbol, fraction) in symbols.iter().zip(&fractions) {
            let price = prices
                .price(start_date, symbol)
                .ok_or_else(|| SimError::DataGap {
                    symbol: symbol.clone(),
                    date: start_date,
                })?;
            let allocated = fraction * start_value;
            let quantity = allocated / price;
            start_holdings.push(quantity);
            start_values.push(quantity * price);
            if symbol != CASH_SYMBOL && allocated > 0.0 {
                cost_basis.insert(symbol.clone(), allocated);
            }
        }

        let universe = symbols
            .iter()
            .filter(|s| *s != CASH_SYMBOL)
            .cloned()
            .collect();

        Ok(Self {
            name: name.to_string(),
            start_date,
            start_value,
            initial_split: initial_split.to_vec(),
            symbols,
            universe,
            cash_col,
            dates: vec![start_date],
            holdings: vec![start_holdings],
            values: vec![start_values],
            hold_duration: HashMap::new(),
            cost_basis,
            rejections: RejectionTally::default(),
            trade_log: TradeLog::new(),
            strategy,
            prices,
        })
    }

    /// Buy `cash_value` worth of `asset` at `date`'s price.
    ///
    /// A buy exceeding available cash is rejected and tallied, never an
    /// error: the greedy strategy keeps going with whatever cash is left.
    pub fn execute_buy(
        &mut self,
        asset: &str,
        cash_value: f64,
        date: NaiveDate,
    ) -> Result<TradeOutcome, SimError> {
        let row = self.row_index(date)?;
        let col = self.tradable_column(asset)?;
        let price = self.price_at(date, asset)?;

        if cash_value > self.holdings[row][self.cash_col] {
            self.rejections.record(RejectKind::InsufficientCash);
            return Ok(TradeOutcome::Rejected(RejectKind::InsufficientCash));
        }

        self.holdings[row][self.cash_col] -= cash_value;
        self.holdings[row][col] += cash_value / price;
        self.hold_duration.insert(asset.to_string(), 0);
        *self.cost_basis.entry(asset.to_string()).or_insert(0.0) += cash_value;
        self.trade_log.record_buy(date, asset, cash_value);

        Ok(TradeOutcome::Executed { value: cash_value })
    }

    /// Sell the entire position in `asset` at `date`'s price.
    ///
    /// Proceeds are floored to the cent so floating error never overstates
    /// the cash credited.
    pub fn execute_sell(&mut self, asset: &str, date: NaiveDate) -> Result<TradeOutcome, SimError> {
        let row = self.row_index(date)?;
        let col = self.tradable_column(asset)?;
        let price = self.price_at(date, asset)?;

        let proceeds = floor_cents(self.holdings[row][col] * price);
        self.holdings[row][self.cash_col] += proceeds;
        self.holdings[row][col] = 0.0;
        self.hold_duration.remove(asset);

        let basis = self.cost_basis.remove(asset).unwrap_or(0.0);
        self.trade_log.record_sell(date, asset, proceeds, proceeds - basis);

        Ok(TradeOutcome::Executed { value: proceeds })
    }

    /// Simulate every calendar day after the last recorded date up to and
    /// including `target_date`.
    ///
    /// Each day is atomic: a missing price fails the day before any ledger
    /// mutation, leaving previously committed days intact. Dates at or
    /// before the last recorded date are a no-op.
    pub fn advance(&mut self, target_date: NaiveDate) -> Result<(), SimError> {
        let mut date = self.last_date() + Duration::days(1);
        while date <= target_date {
            self.step_day(date)?;
            date += Duration::days(1);
        }
        Ok(())
    }

    fn step_day(&mut self, date: NaiveDate) -> Result<(), SimError> {
        // Fail before any mutation: the whole day needs prices for every
        // column (trades, valuation), so a single gap aborts it cleanly.
        let mut day_prices = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            match self.prices.price(date, symbol) {
                Some(price) => day_prices.push(price),
                None => {
                    return Err(SimError::DataGap {
                        symbol: symbol.clone(),
                        date,
                    });
                }
            }
        }

        let baseline = self.holdings[self.holdings.len() - 1].clone();
        self.dates.push(date);
        self.holdings.push(baseline);

        for days in self.hold_duration.values_mut() {
            *days += 1;
        }

        let plan = {
            let state = self.day_state();
            self.strategy.decide(&state, date, self.prices)
        };

        // Sells first: proceeds are available to the same day's buys.
        for asset in &plan.sells {
            self.execute_sell(asset, date)?;
        }
        for (asset, value) in &plan.buys {
            self.execute_buy(asset, *value, date)?;
        }

        let row = self.holdings.len() - 1;
        let value_row: Vec<f64> = self.holdings[row]
            .iter()
            .zip(&day_prices)
            .map(|(quantity, price)| quantity * price)
            .collect();
        self.values.push(value_row);

        Ok(())
    }

    /// Pre-trade view of the day handed to the strategy: today's baseline
    /// cash and the last committed valuation.
    fn day_state(&self) -> PortfolioState<'_> {
        let row = self.holdings.len() - 1;
        let held = self
            .symbols
            .iter()
            .enumerate()
            .filter(|(col, _)| *col != self.cash_col && self.holdings[row][*col] > 0.0)
            .map(|(_, symbol)| symbol.clone())
            .collect();

        PortfolioState {
            cash: self.holdings[row][self.cash_col],
            total_value: self.valuate(),
            held,
            universe: &self.universe,
            hold_duration: &self.hold_duration,
        }
    }

    /// Latest total value, rounded to cents.
    pub fn valuate(&self) -> f64 {
        let row = &self.values[self.values.len() - 1];
        round2(row.iter().sum())
    }

    /// Per-day total value, each rounded to cents.
    pub fn value_history(&self) -> Vec<(NaiveDate, f64)> {
        self.dates
            .iter()
            .zip(&self.values)
            .map(|(date, row)| (*date, round2(row.iter().sum())))
            .collect()
    }

    /// Annualized return in percent over the simulated window, rounded to
    /// two decimals.
    pub fn roi(&self) -> f64 {
        let final_value: f64 = self.values[self.values.len() - 1].iter().sum();
        round2(metrics::annualized_return(
            self.start_value,
            final_value,
            self.dates.len(),
        ))
    }

    /// Volatility of the daily value history, in percent.
    pub fn volatility(&self) -> f64 {
        let totals: Vec<f64> = self.value_history().iter().map(|(_, v)| *v).collect();
        metrics::volatility(&totals)
    }

    /// Formatted report block, one line per figure.
    pub fn summary(&self) -> String {
        format!(
            "Start value:   {}\n\
             Current value: {}\n\
             Total return:  {}\n\
             Days held:     {}\n\
             Annualised:    {} %\n\
             Volatility:    {}",
            self.start_value,
            self.valuate(),
            round2(self.valuate() - self.start_value),
            self.dates.len(),
            self.roi(),
            round2(self.volatility()),
        )
    }

    /// Snapshot the portfolio into its persisted form.
    pub fn to_record(&self) -> BotRecord {
        BotRecord {
            name: self.name.clone(),
            start_date: self.start_date,
            start_value: self.start_value,
            strategy_description: self.strategy.describe(),
            initial_allocation: self.initial_split.clone(),
            final_roi: self.roi(),
            final_volatility: round2(self.volatility()),
            holdings: LedgerSnapshot {
                symbols: self.symbols.clone(),
                dates: self.dates.clone(),
                rows: self.holdings.clone(),
            },
            values: LedgerSnapshot {
                symbols: self.symbols.clone(),
                dates: self.dates.clone(),
                rows: self.values.clone(),
            },
            trade_log: self.trade_log.records().to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn start_value(&self) -> f64 {
        self.start_value
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn day_count(&self) -> usize {
        self.dates.len()
    }

    pub fn cash(&self) -> f64 {
        self.holdings[self.holdings.len() - 1][self.cash_col]
    }

    /// Latest quantity of `asset`, `None` for symbols outside the ledger.
    pub fn quantity(&self, asset: &str) -> Option<f64> {
        let col = self.symbols.iter().position(|s| s == asset)?;
        Some(self.holdings[self.holdings.len() - 1][col])
    }

    pub fn hold_duration(&self) -> &HashMap<String, u32> {
        &self.hold_duration
    }

    pub fn rejections(&self) -> &RejectionTally {
        &self.rejections
    }

    pub fn trade_log(&self) -> &TradeLog {
        &self.trade_log
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    fn row_index(&self, date: NaiveDate) -> Result<usize, SimError> {
        let offset = (date - self.start_date).num_days();
        if offset < 0 || offset as usize >= self.dates.len() {
            return Err(SimError::LedgerDate { date });
        }
        Ok(offset as usize)
    }

    fn tradable_column(&self, asset: &str) -> Result<usize, SimError> {
        self.symbols
            .iter()
            .position(|s| s == asset)
            .filter(|col| *col != self.cash_col)
            .ok_or_else(|| SimError::UnknownSymbol {
                symbol: asset.to_string(),
            })
    }

    fn price_at(&self, date: NaiveDate, asset: &str) -> Result<f64, SimError> {
        self.prices
            .price(date, asset)
            .ok_or_else(|| SimError::DataGap {
                symbol: asset.to_string(),
                date,
            })
    }
}

fn validate_split(initial_split: &[(String, f64)]) -> Result<(), SimError> {
    let mut seen = std::collections::HashSet::new();
    for (symbol, fraction) in initial_split {
        if !seen.insert(symbol.as_str()) {
            return Err(SimError::AllocationInvalid {
                reason: format!("duplicate asset {symbol}"),
            });
        }
        if *fraction < 0.0 {
            return Err(SimError::AllocationInvalid {
                reason: format!("negative fraction for {symbol}"),
            });
        }
    }

    let sum: f64 = initial_split.iter().map(|(_, f)| f).sum();
    if (sum - 1.0).abs() > ALLOCATION_TOLERANCE {
        return Err(SimError::AllocationInvalid {
            reason: format!("fractions sum to {sum:.4}, expected 1.00 (±0.01)"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::{BuyRule, RulesParams, SellRule};
    use crate::domain::trade_log::TradeAction;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn split(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(s, f)| (s.to_string(), *f)).collect()
    }

    fn flat_table(days: usize) -> PriceTable {
        let rows = (0..days)
            .map(|i| {
                (
                    date(2023, 1, 1) + Duration::days(i as i64),
                    vec![100.0, 50.0, 1.0],
                )
            })
            .collect();
        PriceTable::new(vec!["BTC".into(), "ETH".into(), CASH_SYMBOL.into()], rows).unwrap()
    }

    fn rules_strategy() -> Strategy {
        Strategy::Rules(RulesParams {
            buy_rule: BuyRule::Consecutive,
            buy_period: 2,
            buy_signal: 0.1,
            sell_rule: SellRule::HoldDays,
            sell_period: 2,
            max_exposure: 0.1,
        })
    }

    #[test]
    fn initial_quantities_follow_the_split() {
        let prices = flat_table(1);
        let portfolio = Portfolio::new(
            "split",
            &split(&[("BTC", 0.5), ("ETH", 0.5)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        )
        .unwrap();

        assert_relative_eq!(portfolio.quantity("BTC").unwrap(), 5.0);
        assert_relative_eq!(portfolio.quantity("ETH").unwrap(), 10.0);
        assert_relative_eq!(portfolio.quantity(CASH_SYMBOL).unwrap(), 0.0);
        assert_relative_eq!(portfolio.valuate(), 1000.0);
    }

    #[test]
    fn cash_column_appended_when_absent() {
        let prices = flat_table(1);
        let portfolio = Portfolio::new(
            "no-cash",
            &split(&[("BTC", 1.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        )
        .unwrap();

        assert_eq!(portfolio.symbols(), &["BTC", CASH_SYMBOL]);
        assert_eq!(portfolio.universe(), &["BTC"]);
    }

    #[test]
    fn split_must_sum_to_one() {
        let prices = flat_table(1);
        let result = Portfolio::new(
            "bad-sum",
            &split(&[("BTC", 0.5), ("ETH", 0.3)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        );
        assert!(matches!(result, Err(SimError::AllocationInvalid { .. })));
    }

    #[test]
    fn split_tolerates_rounding_slack() {
        let prices = flat_table(1);
        let result = Portfolio::new(
            "thirds",
            &split(&[("BTC", 0.33), ("ETH", 0.33), (CASH_SYMBOL, 0.33)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn split_rejects_duplicates() {
        let prices = flat_table(1);
        let result = Portfolio::new(
            "dupe",
            &split(&[("BTC", 0.5), ("BTC", 0.5)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        );
        assert!(matches!(result, Err(SimError::AllocationInvalid { .. })));
    }

    #[test]
    fn construction_needs_a_start_price() {
        let prices = flat_table(1);
        let result = Portfolio::new(
            "gap",
            &split(&[("XRP", 1.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        );
        assert!(matches!(result, Err(SimError::DataGap { .. })));
    }

    #[test]
    fn buy_moves_cash_into_the_asset() {
        let prices = flat_table(1);
        let mut portfolio = Portfolio::new(
            "buyer",
            &split(&[("BTC", 0.0), ("ETH", 0.0), (CASH_SYMBOL, 1.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            rules_strategy(),
        )
        .unwrap();

        let outcome = portfolio
            .execute_buy("BTC", 250.0, date(2023, 1, 1))
            .unwrap();
        assert_eq!(outcome, TradeOutcome::Executed { value: 250.0 });
        assert_relative_eq!(portfolio.cash(), 750.0);
        assert_relative_eq!(portfolio.quantity("BTC").unwrap(), 2.5);
        assert_eq!(portfolio.hold_duration().get("BTC"), Some(&0));
        assert_eq!(portfolio.trade_log().len(), 1);
        assert_eq!(portfolio.trade_log().records()[0].action, TradeAction::Buy);
    }

    #[test]
    fn overdrawn_buy_is_rejected_and_tallied_once() {
        let prices = flat_table(1);
        let mut portfolio = Portfolio::new(
            "broke",
            &split(&[("BTC", 0.0), (CASH_SYMBOL, 1.0)]),
            date(2023, 1, 1),
            100.0,
            &prices,
            rules_strategy(),
        )
        .unwrap();

        let outcome = portfolio
            .execute_buy("BTC", 100.01, date(2023, 1, 1))
            .unwrap();
        assert_eq!(
            outcome,
            TradeOutcome::Rejected(RejectKind::InsufficientCash)
        );
        assert_relative_eq!(portfolio.cash(), 100.0);
        assert_relative_eq!(portfolio.quantity("BTC").unwrap(), 0.0);
        assert_eq!(portfolio.rejections().count(RejectKind::InsufficientCash), 1);
        assert!(portfolio.trade_log().is_empty());
        assert!(portfolio.hold_duration().is_empty());
    }

    #[test]
    fn sell_floors_proceeds_to_cents() {
        // 3.333... BTC at 100: raw proceeds 333.333..., floored to 333.33.
        let prices = flat_table(1);
        let mut portfolio = Portfolio::new(
            "seller",
            &split(&[("BTC", 1.0 / 3.0), (CASH_SYMBOL, 2.0 / 3.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            rules_strategy(),
        )
        .unwrap();

        let outcome = portfolio.execute_sell("BTC", date(2023, 1, 1)).unwrap();
        assert_eq!(outcome, TradeOutcome::Executed { value: 333.33 });
        assert_relative_eq!(portfolio.quantity("BTC").unwrap(), 0.0);
        assert_relative_eq!(portfolio.cash(), 2000.0 / 3.0 + 333.33, epsilon = 1e-9);

        let record = &portfolio.trade_log().records()[0];
        assert_eq!(record.action, TradeAction::Sell);
        // Bought into at construction for a third of 1000.
        let basis = 1000.0 / 3.0;
        assert_relative_eq!(record.profit.unwrap(), 333.33 - basis, epsilon = 1e-9);
    }

    #[test]
    fn sell_removes_hold_duration() {
        let prices = flat_table(1);
        let mut portfolio = Portfolio::new(
            "churn",
            &split(&[("ETH", 0.0), (CASH_SYMBOL, 1.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            rules_strategy(),
        )
        .unwrap();

        portfolio.execute_buy("ETH", 100.0, date(2023, 1, 1)).unwrap();
        assert!(portfolio.hold_duration().contains_key("ETH"));
        portfolio.execute_sell("ETH", date(2023, 1, 1)).unwrap();
        assert!(!portfolio.hold_duration().contains_key("ETH"));
    }

    #[test]
    fn cash_itself_is_not_tradable() {
        let prices = flat_table(1);
        let mut portfolio = Portfolio::new(
            "cashless",
            &split(&[(CASH_SYMBOL, 1.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        )
        .unwrap();

        let result = portfolio.execute_buy(CASH_SYMBOL, 10.0, date(2023, 1, 1));
        assert!(matches!(result, Err(SimError::UnknownSymbol { .. })));
    }

    #[test]
    fn trades_need_an_existing_ledger_row() {
        let prices = flat_table(5);
        let mut portfolio = Portfolio::new(
            "early",
            &split(&[("BTC", 0.0), (CASH_SYMBOL, 1.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            rules_strategy(),
        )
        .unwrap();

        let result = portfolio.execute_buy("BTC", 10.0, date(2023, 1, 3));
        assert!(matches!(result, Err(SimError::LedgerDate { .. })));
    }

    #[test]
    fn advance_extends_the_ledger_day_by_day() {
        let prices = flat_table(5);
        let mut portfolio = Portfolio::new(
            "hold",
            &split(&[("BTC", 0.5), ("ETH", 0.5)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        )
        .unwrap();

        portfolio.advance(date(2023, 1, 5)).unwrap();

        assert_eq!(portfolio.day_count(), 5);
        assert_eq!(portfolio.last_date(), date(2023, 1, 5));
        let history = portfolio.value_history();
        assert!(history.windows(2).all(|w| w[1].0 - w[0].0 == Duration::days(1)));
        // Flat prices, hold strategy: value never moves.
        assert!(history.iter().all(|(_, v)| (*v - 1000.0).abs() < 1e-9));
        assert_eq!(portfolio.volatility(), 0.0);
    }

    #[test]
    fn advance_is_incremental_and_idempotent_on_old_dates() {
        let prices = flat_table(5);
        let mut portfolio = Portfolio::new(
            "steps",
            &split(&[("BTC", 1.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        )
        .unwrap();

        portfolio.advance(date(2023, 1, 3)).unwrap();
        assert_eq!(portfolio.day_count(), 3);
        // Re-advancing to an already-committed date changes nothing.
        portfolio.advance(date(2023, 1, 2)).unwrap();
        assert_eq!(portfolio.day_count(), 3);
        portfolio.advance(date(2023, 1, 5)).unwrap();
        assert_eq!(portfolio.day_count(), 5);
    }

    #[test]
    fn advance_past_table_end_fails_and_keeps_committed_days() {
        let prices = flat_table(3);
        let mut portfolio = Portfolio::new(
            "gap",
            &split(&[("BTC", 1.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        )
        .unwrap();

        let result = portfolio.advance(date(2023, 1, 10));
        assert!(matches!(result, Err(SimError::DataGap { .. })));
        // Days 1-3 committed before the gap at day 4.
        assert_eq!(portfolio.day_count(), 3);
        assert_eq!(portfolio.last_date(), date(2023, 1, 3));
        // The failed day left no partial row behind.
        assert_eq!(portfolio.value_history().len(), 3);
    }

    #[test]
    fn hold_durations_tick_only_for_strategy_positions() {
        let prices = flat_table(4);
        let mut portfolio = Portfolio::new(
            "durations",
            &split(&[("BTC", 0.5), ("ETH", 0.0), (CASH_SYMBOL, 0.5)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        )
        .unwrap();

        portfolio
            .execute_buy("ETH", 100.0, date(2023, 1, 1))
            .unwrap();
        portfolio.advance(date(2023, 1, 4)).unwrap();

        // ETH was bought by hand, BTC came from the initial allocation and
        // never entered the duration map.
        assert_eq!(portfolio.hold_duration().get("ETH"), Some(&3));
        assert!(!portfolio.hold_duration().contains_key("BTC"));
    }

    #[test]
    fn zero_trade_roi_matches_closed_form() {
        let rows = (0..10)
            .map(|i| {
                (
                    date(2023, 1, 1) + Duration::days(i as i64),
                    vec![100.0 + i as f64, 1.0],
                )
            })
            .collect();
        let prices =
            PriceTable::new(vec!["BTC".into(), CASH_SYMBOL.into()], rows).unwrap();
        let mut portfolio = Portfolio::new(
            "roi",
            &split(&[("BTC", 1.0)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        )
        .unwrap();
        portfolio.advance(date(2023, 1, 10)).unwrap();

        let end_value = portfolio.valuate();
        let expected = round2(((end_value / 1000.0).powf(365.0 / 10.0) - 1.0) * 100.0);
        assert_relative_eq!(portfolio.roi(), expected);
    }

    #[test]
    fn record_round_trip_reproduces_metrics() {
        let rows = (0..6)
            .map(|i| {
                (
                    date(2023, 1, 1) + Duration::days(i as i64),
                    vec![100.0 * (1.0 + 0.01 * i as f64), 50.0, 1.0],
                )
            })
            .collect();
        let prices = PriceTable::new(
            vec!["BTC".into(), "ETH".into(), CASH_SYMBOL.into()],
            rows,
        )
        .unwrap();
        let mut portfolio = Portfolio::new(
            "persisted",
            &split(&[("BTC", 0.6), ("ETH", 0.4)]),
            date(2023, 1, 1),
            1000.0,
            &prices,
            Strategy::Hold,
        )
        .unwrap();
        portfolio.advance(date(2023, 1, 6)).unwrap();

        let record = portfolio.to_record();
        assert_eq!(record.valuate(), portfolio.valuate());
        assert_eq!(record.roi(), portfolio.roi());
        assert_eq!(record.volatility(), portfolio.volatility());
        assert_eq!(record.days_held(), portfolio.day_count());
    }
}
