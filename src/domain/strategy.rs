//! Strategy variants and daily trade decisions.
//!
//! A strategy is consulted once per simulated day with a read-only view of
//! the portfolio and returns the day's intents. It never mutates the ledger;
//! the portfolio applies the plan (sells before buys).

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::error::SimError;
use crate::domain::money::{floor_cents, round2};
use crate::domain::prices::PriceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyRule {
    /// Price strictly increased on each of the last `buy_period` comparisons.
    Consecutive,
    /// Price gained at least `buy_signal` over the last `buy_period` days.
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellRule {
    /// Sell once an asset has been held for `sell_period` days.
    HoldDays,
    /// Sell once price dropped on `sell_period` consecutive comparisons.
    Reversal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RulesParams {
    pub buy_rule: BuyRule,
    pub buy_period: u32,
    /// Fractional gain threshold, window rule only.
    pub buy_signal: f64,
    pub sell_rule: SellRule,
    pub sell_period: u32,
    /// Maximum share of total portfolio value committed to one new position.
    pub max_exposure: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Hold,
    Rules(RulesParams),
}

/// The day's trade intents: every sell is applied before any buy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradePlan {
    pub sells: Vec<String>,
    pub buys: Vec<(String, f64)>,
}

/// Read-only snapshot of the portfolio handed to `decide`.
///
/// `cash` is the day's pre-trade cash and `total_value` the last committed
/// valuation; `held` and `universe` are in ledger column order, which fixes
/// the evaluation and emission order of candidates.
#[derive(Debug)]
pub struct PortfolioState<'a> {
    pub cash: f64,
    pub total_value: f64,
    pub held: Vec<String>,
    pub universe: &'a [String],
    pub hold_duration: &'a HashMap<String, u32>,
}

impl Strategy {
    pub fn validate(&self) -> Result<(), SimError> {
        let Strategy::Rules(params) = self else {
            return Ok(());
        };
        if params.buy_period == 0 {
            return Err(SimError::StrategyInvalid {
                reason: "buy_period must be at least 1".into(),
            });
        }
        if params.sell_period == 0 {
            return Err(SimError::StrategyInvalid {
                reason: "sell_period must be at least 1".into(),
            });
        }
        if params.max_exposure <= 0.0 || params.max_exposure > 1.0 {
            return Err(SimError::StrategyInvalid {
                reason: "max_exposure must be in (0, 1]".into(),
            });
        }
        if params.buy_rule == BuyRule::Window && (params.buy_signal <= 0.0 || params.buy_signal > 1.0)
        {
            return Err(SimError::StrategyInvalid {
                reason: "buy_signal must be in (0, 1] for the window rule".into(),
            });
        }
        Ok(())
    }

    /// Evaluate the day's signals and produce an ordered trade plan.
    ///
    /// Deterministic: identical state, date and prices always produce the
    /// identical plan. Candidates are never re-sorted by signal strength.
    pub fn decide(&self, state: &PortfolioState, date: NaiveDate, prices: &PriceTable) -> TradePlan {
        match self {
            Strategy::Hold => TradePlan::default(),
            Strategy::Rules(params) => params.decide(state, date, prices),
        }
    }

    /// Human-readable one-line description, stored in persisted bot records.
    pub fn describe(&self) -> String {
        match self {
            Strategy::Hold => {
                "HOLD: no trades are performed; the starting allocation is maintained.".to_string()
            }
            Strategy::Rules(params) => params.describe(),
        }
    }
}

impl RulesParams {
    fn decide(&self, state: &PortfolioState, date: NaiveDate, prices: &PriceTable) -> TradePlan {
        let sells = self.sell_candidates(state, date, prices);
        let buys = self.sized_buys(state, date, prices);
        TradePlan { sells, buys }
    }

    fn sell_candidates(
        &self,
        state: &PortfolioState,
        date: NaiveDate,
        prices: &PriceTable,
    ) -> Vec<String> {
        match self.sell_rule {
            SellRule::HoldDays => state
                .universe
                .iter()
                .filter(|asset| {
                    state
                        .hold_duration
                        .get(*asset)
                        .is_some_and(|days| *days >= self.sell_period)
                })
                .cloned()
                .collect(),
            SellRule::Reversal => state
                .held
                .iter()
                .filter(|asset| fell_on_each_of_last(prices, date, asset.as_str(), self.sell_period))
                .cloned()
                .collect(),
        }
    }

    fn sized_buys(
        &self,
        state: &PortfolioState,
        date: NaiveDate,
        prices: &PriceTable,
    ) -> Vec<(String, f64)> {
        let mut candidates: Vec<&String> = Vec::new();
        for asset in state.universe {
            if state.held.contains(asset) {
                continue;
            }
            let qualifies = match self.buy_rule {
                BuyRule::Consecutive => rose_on_each_of_last(prices, date, asset, self.buy_period),
                BuyRule::Window => window_gain(prices, date, asset, self.buy_period)
                    .is_some_and(|gain| gain >= self.buy_signal),
            };
            if qualifies {
                candidates.push(asset);
            }
        }

        // Under a dollar of cash there is nothing worth splitting.
        if candidates.is_empty() || state.cash < 1.0 {
            return Vec::new();
        }

        let target = state.total_value * self.max_exposure;
        let count = candidates.len() as f64;
        // Even split when cash cannot cover the target for every candidate;
        // flooring leaves the sub-cent remainder uninvested.
        let value = if state.cash < target * count {
            floor_cents(state.cash / count)
        } else {
            floor_cents(target)
        };

        candidates
            .into_iter()
            .map(|asset| (asset.clone(), value))
            .collect()
    }

    fn describe(&self) -> String {
        let buy = match self.buy_rule {
            BuyRule::Consecutive => format!(
                "BUY up to {}% of total portfolio value of a coin if its price has gone up on at least {} consecutive days.",
                percent(self.max_exposure),
                self.buy_period
            ),
            BuyRule::Window => format!(
                "BUY up to {}% of total portfolio value of a coin if its price has gone up by at least {}% in the last {} days.",
                percent(self.max_exposure),
                percent(self.buy_signal),
                self.buy_period
            ),
        };
        let sell = match self.sell_rule {
            SellRule::HoldDays => format!(
                "SELL a coin once it has been held for {} days.",
                self.sell_period
            ),
            SellRule::Reversal => format!(
                "SELL a coin once its price has dropped on {} consecutive days.",
                self.sell_period
            ),
        };
        format!("{buy} {sell}")
    }
}

fn percent(fraction: f64) -> f64 {
    round2(fraction * 100.0)
}

fn rose_on_each_of_last(prices: &PriceTable, date: NaiveDate, symbol: &str, periods: u32) -> bool {
    (0..periods as usize).all(|i| {
        match (
            prices.lookback(date, symbol, i),
            prices.lookback(date, symbol, i + 1),
        ) {
            (Some(newer), Some(older)) => newer > older,
            _ => false,
        }
    })
}

fn fell_on_each_of_last(prices: &PriceTable, date: NaiveDate, symbol: &str, periods: u32) -> bool {
    (0..periods as usize).all(|i| {
        match (
            prices.lookback(date, symbol, i),
            prices.lookback(date, symbol, i + 1),
        ) {
            (Some(newer), Some(older)) => newer < older,
            _ => false,
        }
    })
}

fn window_gain(prices: &PriceTable, date: NaiveDate, symbol: &str, period: u32) -> Option<f64> {
    let now = prices.price(date, symbol)?;
    let then = prices.lookback(date, symbol, period as usize)?;
    if then <= 0.0 {
        return None;
    }
    Some((now - then) / then)
}
