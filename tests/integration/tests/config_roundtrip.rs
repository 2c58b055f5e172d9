//! Config save/load roundtrip integration tests.

use std::path::Path;

use keeper_core::config::{Config, LogLevel, StorageBackend};
use keeper_server::{ServerConfig, StorageConfig};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.address, config.server.address);
    assert_eq!(loaded.server.token_ttl_secs, config.server.token_ttl_secs);
    assert_eq!(loaded.storage.backend, config.storage.backend);
    assert_eq!(loaded.logging.level, config.logging.level);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let mut config = Config::default();
    config.server.address = "0.0.0.0:9090".to_string();
    config.storage.backend = StorageBackend::Memory;
    config.logging.level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.address, "0.0.0.0:9090");
    assert_eq!(loaded.storage.backend, StorageBackend::Memory);
    assert_eq!(loaded.logging.level, LogLevel::Debug);
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/config.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}

#[test]
fn test_config_drives_server_settings() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("objects");
    let config = Config::parse(&format!(
        r#"{{
            server: {{
                address: "127.0.0.1:7000",
                database_url: "sqlite::memory:",
                token_ttl_secs: 60,
            }},
            storage: {{ backend: "fs", root: "{}", list_timeout_secs: 2 }},
        }}"#,
        root.display()
    ))
    .unwrap();

    let server = ServerConfig::from_config(&config).unwrap();
    assert_eq!(server.address, "127.0.0.1:7000");
    assert_eq!(server.token_ttl.as_secs(), 60);
    assert_eq!(server.storage, StorageConfig::Fs(root));
    assert_eq!(server.files.list_timeout.as_secs(), 2);
}
