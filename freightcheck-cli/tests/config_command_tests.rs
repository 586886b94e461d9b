//! Integration tests for the `freightcheck config` command.
//!
//! Tests validation and display with real TOML files.

use std::fs;

use tempfile::TempDir;

use freightcheck_cli::cli::{ConfigAction, ConfigArgs, OutputFormat};
use freightcheck_cli::commands::config::{build_config_report, execute, redact_credentials};
use freightcheck_cli::output::OutputWriter;
use freightcheck_core::config::FreightcheckConfig;

const VALID: &str = r#"
[general]
log_level = "debug"
log_format = "json"

[api]
domain = "dev"

[poll]
timeout_secs = 60
interval_ms = 500

[roles.lkz]
email = "customer@example.com"
password = "hunter2"
client_id = 1598
"#;

#[tokio::test]
async fn test_config_validate_valid_file() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("freightcheck.toml");
    fs::write(&config_path, VALID).expect("should write config");

    // When: Validating
    let result = execute(
        ConfigArgs {
            action: ConfigAction::Validate,
        },
        &config_path,
        &OutputWriter::new(OutputFormat::Json),
    )
    .await;

    // Then: Should succeed
    assert!(result.is_ok(), "valid config should validate: {result:?}");
}

#[tokio::test]
async fn test_config_validate_missing_file_is_config_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("missing.toml");

    let err = execute(
        ConfigArgs {
            action: ConfigAction::Validate,
        },
        &config_path,
        &OutputWriter::new(OutputFormat::Json),
    )
    .await
    .expect_err("missing file should be invalid");

    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_config_validate_unknown_domain() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad-domain.toml");
    fs::write(&config_path, "[api]\ndomain = \"staging\"\n").expect("should write config");

    let err = execute(
        ConfigArgs {
            action: ConfigAction::Validate,
        },
        &config_path,
        &OutputWriter::new(OutputFormat::Json),
    )
    .await
    .expect_err("unknown domain should be invalid");

    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write config");

    let result = FreightcheckConfig::load(&config_path).await;

    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn test_config_show_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("absent.toml");

    let result = execute(
        ConfigArgs {
            action: ConfigAction::Show { section: None },
        },
        &config_path,
        &OutputWriter::new(OutputFormat::Json),
    )
    .await;

    assert!(result.is_ok(), "show falls back to defaults: {result:?}");
}

#[tokio::test]
async fn test_config_show_roles_hides_password() {
    // Given: A config with a role password
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("freightcheck.toml");
    fs::write(&config_path, VALID).expect("should write config");

    // When: Building the roles section the way `config show` does
    let mut config = FreightcheckConfig::load(&config_path)
        .await
        .expect("config should load");
    redact_credentials(&mut config);
    let report = build_config_report(&config, "freightcheck.toml", Some("roles".to_owned()))
        .expect("roles is a known section");

    // Then: The email is shown but the password is not
    assert!(report.config_toml.contains("customer@example.com"));
    assert!(report.config_toml.contains("1598"));
    assert!(!report.config_toml.contains("hunter2"));
}

#[tokio::test]
async fn test_config_show_unknown_section() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("freightcheck.toml");
    fs::write(&config_path, VALID).expect("should write config");

    let err = execute(
        ConfigArgs {
            action: ConfigAction::Show {
                section: Some("metrics".to_owned()),
            },
        },
        &config_path,
        &OutputWriter::new(OutputFormat::Json),
    )
    .await
    .expect_err("unknown section");

    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("metrics"));
}
