#![forbid(unsafe_code)]

//! TOML loading for [`ReconcilerConfig`].

use slist_runtime::{ConfigError, ReconcilerConfig};

#[test]
fn empty_document_yields_defaults() {
    let config = ReconcilerConfig::from_toml_str("").unwrap();
    assert_eq!(config, ReconcilerConfig::default());
}

#[test]
fn explicit_values_override_defaults() {
    let config = ReconcilerConfig::from_toml_str(
        r#"
        animate_differences = false
        "#,
    )
    .unwrap();
    assert!(!config.animate_differences);
    assert!(config.recover_from_observed_state);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = ReconcilerConfig::from_toml_str("animate = true").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("invalid list configuration"));
}

#[test]
fn wrong_types_are_rejected() {
    let err = ReconcilerConfig::from_toml_str("animate_differences = \"yes\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn serializes_back_to_toml() {
    let config = ReconcilerConfig {
        animate_differences: false,
        recover_from_observed_state: false,
    };
    let text = toml::to_string(&config).unwrap();
    assert_eq!(ReconcilerConfig::from_toml_str(&text).unwrap(), config);
}
