//! Bot store port trait.

use crate::domain::error::SimError;
use crate::domain::record::BotRecord;

/// Persistence for simulated bots, consumed by the comparison tooling.
pub trait BotStorePort {
    fn save(&self, record: &BotRecord) -> Result<(), SimError>;
    fn load(&self, name: &str) -> Result<BotRecord, SimError>;
    /// Names of every stored bot, sorted.
    fn list(&self) -> Result<Vec<String>, SimError>;
    fn delete(&self, name: &str) -> Result<(), SimError>;
}
