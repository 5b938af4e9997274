//! Bot configuration loading and validation.
//!
//! Every field is checked before a simulation runs; UI-style ambient state
//! is rejected in favor of one explicit config object handed to the
//! portfolio constructor.

use chrono::NaiveDate;

use crate::domain::error::SimError;
use crate::domain::prices::CASH_SYMBOL;
use crate::domain::strategy::{BuyRule, RulesParams, SellRule, Strategy};
use crate::domain::universe::{parse_split, parse_symbols};
use crate::ports::config_port::ConfigPort;

/// Everything needed to construct and simulate one bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub name: String,
    pub start_date: NaiveDate,
    pub start_value: f64,
    pub strategy: Strategy,
    pub allocation: Vec<(String, f64)>,
}

pub fn load_bot_config(config: &dyn ConfigPort) -> Result<BotConfig, SimError> {
    let name = require_string(config, "bot", "name")?;
    let start_date = require_date(config, "bot", "start_date")?;

    let start_value = config.get_double("bot", "start_value", 0.0);
    if start_value <= 0.0 {
        return Err(SimError::ConfigInvalid {
            section: "bot".to_string(),
            key: "start_value".to_string(),
            reason: "start_value must be positive".to_string(),
        });
    }

    let strategy = strategy_from_config(config)?;
    let allocation = allocation_from_config(config, &strategy)?;

    Ok(BotConfig {
        name,
        start_date,
        start_value,
        strategy,
        allocation,
    })
}

pub fn validate_bot_config(config: &dyn ConfigPort) -> Result<(), SimError> {
    load_bot_config(config).map(|_| ())
}

pub fn strategy_from_config(config: &dyn ConfigPort) -> Result<Strategy, SimError> {
    let kind = require_string(config, "strategy", "kind")?;
    match kind.to_lowercase().as_str() {
        "hold" => Ok(Strategy::Hold),
        "rules" => rules_from_config(config),
        other => Err(SimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "kind".to_string(),
            reason: format!("unknown strategy kind {other}, expected hold or rules"),
        }),
    }
}

fn rules_from_config(config: &dyn ConfigPort) -> Result<Strategy, SimError> {
    let buy_rule = match require_string(config, "strategy", "buy_rule")?
        .to_lowercase()
        .as_str()
    {
        "consecutive" => BuyRule::Consecutive,
        "window" => BuyRule::Window,
        other => {
            return Err(SimError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "buy_rule".to_string(),
                reason: format!("unknown buy rule {other}, expected consecutive or window"),
            });
        }
    };

    let sell_rule = match require_string(config, "strategy", "sell_rule")?
        .to_lowercase()
        .as_str()
    {
        "hold" => SellRule::HoldDays,
        "reversal" => SellRule::Reversal,
        other => {
            return Err(SimError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "sell_rule".to_string(),
                reason: format!("unknown sell rule {other}, expected hold or reversal"),
            });
        }
    };

    let buy_period = require_period(config, "buy_period")?;
    let sell_period = require_period(config, "sell_period")?;

    if buy_rule == BuyRule::Window && config.get_string("strategy", "buy_signal").is_none() {
        return Err(SimError::ConfigMissing {
            section: "strategy".to_string(),
            key: "buy_signal".to_string(),
        });
    }
    let buy_signal = config.get_double("strategy", "buy_signal", 0.0);
    let max_exposure = config.get_double("strategy", "max_exposure", 0.0);

    let strategy = Strategy::Rules(RulesParams {
        buy_rule,
        buy_period,
        buy_signal,
        sell_rule,
        sell_period,
        max_exposure,
    });
    strategy.validate()?;
    Ok(strategy)
}

/// Resolve the initial allocation section.
///
/// `split` gives explicit fractions. `universe` lists the coins a rules bot
/// considers; it starts all-cash with every considered coin at zero.
pub fn allocation_from_config(
    config: &dyn ConfigPort,
    strategy: &Strategy,
) -> Result<Vec<(String, f64)>, SimError> {
    if let Some(split) = config.get_string("allocation", "split") {
        let allocation = parse_split(&split)?;
        return Ok(allocation);
    }

    if let Some(universe) = config.get_string("allocation", "universe") {
        if matches!(strategy, Strategy::Hold) {
            return Err(SimError::ConfigInvalid {
                section: "allocation".to_string(),
                key: "universe".to_string(),
                reason: "a hold bot needs an explicit split".to_string(),
            });
        }
        let symbols = parse_symbols(&universe)?;
        let mut allocation: Vec<(String, f64)> = symbols
            .into_iter()
            .filter(|s| s != CASH_SYMBOL)
            .map(|s| (s, 0.0))
            .collect();
        allocation.push((CASH_SYMBOL.to_string(), 1.0));
        return Ok(allocation);
    }

    Err(SimError::ConfigMissing {
        section: "allocation".to_string(),
        key: "split".to_string(),
    })
}

fn require_string(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, SimError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(SimError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn require_date(config: &dyn ConfigPort, section: &str, key: &str) -> Result<NaiveDate, SimError> {
    let value = require_string(config, section, key)?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| SimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("invalid {key} format, expected YYYY-MM-DD"),
    })
}

fn require_period(config: &dyn ConfigPort, key: &str) -> Result<u32, SimError> {
    let value = config.get_int("strategy", key, 0);
    if value < 1 {
        return Err(SimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: key.to_string(),
            reason: format!("{key} must be at least 1"),
        });
    }
    Ok(value as u32)
}
