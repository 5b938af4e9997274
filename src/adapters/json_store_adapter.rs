//! JSON file bot store adapter.
//!
//! One `<name>.json` per bot under the store directory. JSON keeps `f64`
//! values exact, so a reloaded record recomputes the same metrics it was
//! saved with.

use std::fs;
use std::path::PathBuf;

use crate::domain::error::SimError;
use crate::domain::record::BotRecord;
use crate::ports::store_port::BotStorePort;

pub struct JsonStoreAdapter {
    base_path: PathBuf,
}

impl JsonStoreAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn record_path(&self, name: &str) -> Result<PathBuf, SimError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(SimError::Store {
                reason: format!("invalid bot name {name:?}"),
            });
        }
        Ok(self.base_path.join(format!("{name}.json")))
    }
}

impl BotStorePort for JsonStoreAdapter {
    fn save(&self, record: &BotRecord) -> Result<(), SimError> {
        let path = self.record_path(&record.name)?;
        fs::create_dir_all(&self.base_path).map_err(|e| SimError::Store {
            reason: format!("failed to create {}: {}", self.base_path.display(), e),
        })?;

        let json = serde_json::to_string_pretty(record).map_err(|e| SimError::Store {
            reason: format!("failed to serialize {}: {}", record.name, e),
        })?;
        fs::write(&path, json).map_err(|e| SimError::Store {
            reason: format!("failed to write {}: {}", path.display(), e),
        })
    }

    fn load(&self, name: &str) -> Result<BotRecord, SimError> {
        let path = self.record_path(name)?;
        let content = fs::read_to_string(&path).map_err(|e| SimError::Store {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| SimError::Store {
            reason: format!("malformed record {}: {}", path.display(), e),
        })
    }

    fn list(&self) -> Result<Vec<String>, SimError> {
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            // An absent store directory just holds no bots yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SimError::Store {
                    reason: format!("failed to read {}: {}", self.base_path.display(), e),
                });
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SimError::Store {
                reason: format!("directory entry error: {e}"),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<(), SimError> {
        let path = self.record_path(name)?;
        fs::remove_file(&path).map_err(|e| SimError::Store {
            reason: format!("failed to delete {}: {}", path.display(), e),
        })
    }
}
