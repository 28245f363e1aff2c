//! Native implementations of the engine's platform seams.

use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::PathBuf;
use std::rc::Rc;
use summit_engagement::{DataLoader, EngagementConfig, EngagementStorage, Snapshot};

/// Config source: the built-in catalog or `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub enum TesterLoader {
    Builtin,
    Directory(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Unknown config: {0}")]
    UnknownConfig(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DataLoader for TesterLoader {
    type Error = LoaderError;

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        match self {
            Self::Builtin if config_name == "engagement" => {
                let value = serde_json::to_value(EngagementConfig::default())?;
                Ok(serde_json::from_value(value)?)
            }
            Self::Builtin => Err(LoaderError::UnknownConfig(config_name.to_string())),
            Self::Directory(dir) => {
                let path = dir.join(format!("{config_name}.json"));
                let json = std::fs::read_to_string(&path)
                    .map_err(|source| LoaderError::Io { path, source })?;
                Ok(serde_json::from_str(&json)?)
            }
        }
    }
}

/// In-process snapshot storage shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl EngagementStorage for MemoryStorage {
    type Error = Infallible;

    fn save_snapshot(&self, key: &str, snapshot: &Snapshot) -> Result<(), Self::Error> {
        match snapshot.to_json() {
            Ok(json) => {
                self.values.borrow_mut().insert(key.to_string(), json);
            }
            Err(err) => log::error!("could not encode snapshot: {err}"),
        }
        Ok(())
    }

    fn load_snapshot(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.raw(key))
    }

    fn delete_snapshot(&self, key: &str) -> Result<(), Self::Error> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
