//! Shared test helpers for handler tests.

use std::sync::Arc;

use crate::config::{Config, ServerConfig, StorageConfig};
use crate::store::FlatFileStore;
use crate::AppState;

pub const TEST_BASE_URL: &str = "https://feedback.example.edu";

/// Create a test AppState backed by a flat-file store in a temporary directory.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    test_state_with(temp_dir, Config::default())
}

/// Like [`test_state`], but starting from `config`. Storage location and
/// base URL are always overridden.
pub fn test_state_with(temp_dir: &tempfile::TempDir, config: Config) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            public_base_url: Some(TEST_BASE_URL.to_string()),
            stylesheet_path: None,
        },
        storage: StorageConfig {
            data_dir: data_dir.to_string_lossy().to_string(),
            ..StorageConfig::default()
        },
        ..config
    };

    let store = FlatFileStore::new(&data_dir).expect("Failed to create test store");
    Arc::new(AppState::new(config, Arc::new(store), String::new()))
}
