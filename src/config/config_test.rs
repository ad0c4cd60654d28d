use std::time::Duration;

use serial_test::serial;
use temp_env::with_vars;

use super::*;

fn cleanup_all_fluxible_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("FLUXIBLE__") {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_settings_should_use_hardcoded_values() {
    let settings = StoreSettings::default();

    assert_eq!(settings.persist.debounce_ms, 200);
    assert_eq!(settings.persist.debounce_window(), Duration::from_millis(200));
    assert!(settings.validate().is_ok());
}

#[test]
#[serial]
fn load_without_sources_should_equal_defaults() {
    cleanup_all_fluxible_env_vars();
    let settings = StoreSettings::load(None).unwrap();

    assert_eq!(settings.persist.debounce_ms, 200);
}

#[test]
#[serial]
fn load_should_merge_environment_overrides() {
    cleanup_all_fluxible_env_vars();
    with_vars(vec![("FLUXIBLE__PERSIST__DEBOUNCE_MS", Some("75"))], || {
        let settings = StoreSettings::load(None).unwrap();

        assert_eq!(settings.persist.debounce_ms, 75);
    });
}

#[test]
#[serial]
fn load_should_reject_zero_debounce_from_environment() {
    cleanup_all_fluxible_env_vars();
    with_vars(vec![("FLUXIBLE__PERSIST__DEBOUNCE_MS", Some("0"))], || {
        assert!(StoreSettings::load(None).is_err());
    });
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_fluxible_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("fluxible.toml");

    std::fs::write(
        &config_path,
        r#"
        [persist]
        debounce_ms = 500 # Override default value
        "#,
    )
    .unwrap();

    let base = StoreSettings::default();
    let settings = base.with_override_config(config_path.to_str().unwrap()).unwrap();

    assert_eq!(settings.persist.debounce_ms, 500);
    // Base is untouched
    assert_eq!(base.persist.debounce_ms, 200);
}

#[test]
#[serial]
fn environment_should_win_over_settings_file() {
    cleanup_all_fluxible_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("fluxible.toml");
    std::fs::write(&config_path, "[persist]\ndebounce_ms = 500\n").unwrap();

    with_vars(vec![("FLUXIBLE__PERSIST__DEBOUNCE_MS", Some("30"))], || {
        let settings = StoreSettings::load(Some(config_path.to_str().unwrap())).unwrap();

        assert_eq!(settings.persist.debounce_ms, 30);
    });
}

#[test]
#[serial]
fn load_should_fail_for_missing_required_file() {
    cleanup_all_fluxible_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing.toml");

    assert!(StoreSettings::load(Some(missing.to_str().unwrap())).is_err());
}
