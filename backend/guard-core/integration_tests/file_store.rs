use guard_core::Kernel;
use guard_core::config::GuardConfig;
use guard_core::storage::{AuthTokens, CREDENTIALS_FILE_NAME, FileStore, KeyValueStore};

use models::{AppMode, StorageTier};

use serde_json::Value;
use tempfile::TempDir;

fn development_config(dir: &TempDir) -> GuardConfig {
    GuardConfig {
        mode: AppMode::Development,
        storage_dir: Some(dir.path().to_path_buf()),
        ..GuardConfig::default()
    }
}

/// **VALUE**: Verifies development credentials survive a restart.
///
/// **WHY THIS MATTERS**: The persistent tier is the reason development mode
/// exists: a developer should not have to log in again after every rebuild.
///
/// **BUG THIS CATCHES**: Writing to the session tier in development, or a
/// file format that the next process cannot read back.
#[test]
fn given_development_login_when_process_restarts_then_still_authenticated() {
    // GIVEN: A login completed by a first "process"
    let dir = TempDir::new().unwrap();
    {
        let kernel = Kernel::from_config(&development_config(&dir)).unwrap();
        kernel.complete_login(&AuthTokens::new("persisted").with_refresh_token("r"));
    }

    // WHEN: A second kernel starts on the same directory
    let kernel = Kernel::from_config(&development_config(&dir)).unwrap();

    // THEN
    let entry = kernel.credentials().entry("auth_token").unwrap();
    assert_eq!(entry.value.expose(), "persisted");
    assert_eq!(entry.tier, StorageTier::Persistent);

    kernel.logout();
    let reopened = Kernel::from_config(&development_config(&dir)).unwrap();
    assert!(!reopened.credentials().is_authenticated());
}

#[test]
fn given_written_store_when_file_inspected_then_plain_json_object() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());

    store.set("user", r#"{"id":1}"#).unwrap();

    let raw = std::fs::read_to_string(dir.path().join(CREDENTIALS_FILE_NAME)).unwrap();
    let parsed: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["user"], r#"{"id":1}"#);
}

#[test]
fn given_two_handles_when_writing_then_each_sees_the_others_keys() {
    let dir = TempDir::new().unwrap();
    let first = FileStore::new(dir.path());
    let second = FileStore::new(dir.path());

    first.set("a", "1").unwrap();
    second.set("b", "2").unwrap();

    assert_eq!(first.get("b").unwrap().as_deref(), Some("2"));
    assert_eq!(second.get("a").unwrap().as_deref(), Some("1"));

    second.clear().unwrap();
    assert_eq!(first.get("a").unwrap(), None);
}
