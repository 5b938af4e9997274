#![allow(dead_code)]

use botsim::domain::prices::{CASH_SYMBOL, PriceTable};
use botsim::domain::strategy::{BuyRule, RulesParams, SellRule, Strategy};
use chrono::{Duration, NaiveDate};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Day `i` of the fixture timeline, counted from 2023-01-01.
pub fn day(i: i64) -> NaiveDate {
    date(2023, 1, 1) + Duration::days(i)
}

/// Table with columns X, Y and cash, one row per element of the close
/// series, starting at `day(0)`.
pub fn two_asset_table(x_closes: &[f64], y_closes: &[f64]) -> PriceTable {
    assert_eq!(x_closes.len(), y_closes.len());
    let rows = x_closes
        .iter()
        .zip(y_closes)
        .enumerate()
        .map(|(i, (x, y))| (day(i as i64), vec![*x, *y, 1.0]))
        .collect();
    PriceTable::new(vec!["X".into(), "Y".into(), CASH_SYMBOL.into()], rows).unwrap()
}

pub fn split(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
    pairs.iter().map(|(s, f)| (s.to_string(), *f)).collect()
}

/// All-cash split over the X/Y universe, the shape a rules bot starts with.
pub fn all_cash_split() -> Vec<(String, f64)> {
    split(&[("X", 0.0), ("Y", 0.0), (CASH_SYMBOL, 1.0)])
}

pub fn rules(
    buy_rule: BuyRule,
    buy_period: u32,
    sell_rule: SellRule,
    sell_period: u32,
    max_exposure: f64,
) -> Strategy {
    Strategy::Rules(RulesParams {
        buy_rule,
        buy_period,
        buy_signal: 0.1,
        sell_rule,
        sell_period,
        max_exposure,
    })
}
