//! Web-specific engine implementation
//!
//! Browser implementations of the summit-engagement platform traits, plus a
//! re-export of the core types so UI code only depends on this crate.

use crate::context::EngagementContext;
use crate::dom;
use serde::de::DeserializeOwned;

// Re-export all types from summit-engagement
pub use summit_engagement::*;

/// Loads configuration embedded from static assets at build time.
pub struct WebDataLoader;

#[derive(Debug, thiserror::Error)]
pub enum WebDataError {
    #[error("Unknown config: {0}")]
    UnknownConfig(String),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DataLoader for WebDataLoader {
    type Error = WebDataError;

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let json = match config_name {
            "engagement" => include_str!("../static/assets/data/engagement.json"),
            _ => return Err(WebDataError::UnknownConfig(config_name.to_string())),
        };
        serde_json::from_str(json).map_err(WebDataError::Json)
    }
}

/// Snapshot storage backed by `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebStorage;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("localStorage is unavailable")]
    Unavailable,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn local_storage() -> Result<web_sys::Storage, WebStorageError> {
    dom::local_storage().ok_or(WebStorageError::Unavailable)
}

impl EngagementStorage for WebStorage {
    type Error = WebStorageError;

    fn save_snapshot(&self, key: &str, snapshot: &Snapshot) -> Result<(), Self::Error> {
        let json = snapshot.to_json()?;
        local_storage()?
            .set_item(key, &json)
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))
    }

    fn load_snapshot(&self, key: &str) -> Result<Option<String>, Self::Error> {
        local_storage()?
            .get_item(key)
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))
    }

    fn delete_snapshot(&self, key: &str) -> Result<(), Self::Error> {
        local_storage()?
            .remove_item(key)
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))
    }
}

/// Wall clock from `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        numbers::f64_to_u64(js_sys::Date::now())
    }
}

pub type WebEngine = EngagementEngine<WebDataLoader, WebStorage>;

/// Create a web-compatible engine with `WebDataLoader` and `WebStorage`
#[must_use]
pub const fn create_web_engine() -> WebEngine {
    EngagementEngine::new(WebDataLoader, WebStorage)
}

pub type WebContext = EngagementContext<WebDataLoader, WebStorage, JsClock>;

/// Open the visitor's persisted session in this browser.
#[must_use]
pub fn open_web_context() -> WebContext {
    EngagementContext::open(create_web_engine(), JsClock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_loads_and_validates() {
        let config: EngagementConfig = WebDataLoader.load_config("engagement").unwrap();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.storage_key, "summit.engagement");
    }

    #[test]
    fn unknown_config_is_rejected() {
        let err = WebDataLoader
            .load_config::<EngagementConfig>("pricing")
            .unwrap_err();
        assert!(matches!(err, WebDataError::UnknownConfig(name) if name == "pricing"));
    }
}
