use clap::Parser;
use log::LevelFilter;
use midikeyrs::cli::{format_device_list, Args};
use midikeyrs::config::{Settings, SettingsError};
use midikeyrs::midi::PortDetails;
use std::fs;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = Settings::defaults().unwrap().build().unwrap();
    let settings = Settings::from_config(&config).unwrap();

    assert!(settings.enabled);
    assert_eq!(settings.poll_interval(), Duration::from_millis(500));
    assert_eq!(settings.client_name, "midikeyrs");
    assert_eq!(settings.log_level, LevelFilter::Info);

    let options = settings.handler_options();
    assert!(options.enabled);
    assert_eq!(options.poll_interval, Duration::from_millis(500));
}

#[test]
fn test_zero_poll_interval_is_rejected() {
    let config = Settings::defaults()
        .unwrap()
        .set_override("poll_interval_ms", 0)
        .unwrap()
        .build()
        .unwrap();
    assert!(matches!(
        Settings::from_config(&config),
        Err(SettingsError::InvalidPollInterval(0))
    ));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let config = Settings::defaults()
        .unwrap()
        .set_override("log_level", "loud")
        .unwrap()
        .build()
        .unwrap();
    assert!(matches!(
        Settings::from_config(&config),
        Err(SettingsError::InvalidLogLevel(_))
    ));
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("midikeyrs-test-{}.toml", std::process::id()));
    fs::write(
        &path,
        "enabled = false\npoll_interval_ms = 250\nlog_level = \"trace\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(&path)).unwrap();
    fs::remove_file(&path).unwrap();

    assert!(!settings.enabled);
    assert_eq!(settings.poll_interval_ms, 250);
    assert_eq!(settings.log_level, LevelFilter::Trace);
    assert_eq!(settings.client_name, "midikeyrs");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let path = std::env::temp_dir().join("midikeyrs-does-not-exist.toml");
    assert!(Settings::load(Some(&path)).is_err());
}

#[test]
fn test_args_override_settings() {
    let config = Settings::defaults().unwrap().build().unwrap();
    let mut settings = Settings::from_config(&config).unwrap();

    let args = Args::parse_from(["test", "--disabled", "--poll-interval-ms", "50"]);
    settings.apply_args(&args).unwrap();

    assert!(!settings.enabled);
    assert_eq!(settings.poll_interval(), Duration::from_millis(50));
}

#[test]
fn test_zero_poll_interval_flag_is_rejected() {
    let config = Settings::defaults().unwrap().build().unwrap();
    let mut settings = Settings::from_config(&config).unwrap();

    let args = Args::parse_from(["test", "--poll-interval-ms", "0"]);
    assert!(matches!(
        settings.apply_args(&args),
        Err(SettingsError::InvalidPollInterval(0))
    ));
    assert_eq!(settings.poll_interval(), Duration::from_millis(500));
}

#[test]
fn test_args_defaults() {
    let args = Args::parse_from(["test"]);
    assert!(!args.list_devices);
    assert!(!args.disabled);
    assert!(!args.log_stderr);
    assert_eq!(args.config, None);
    assert_eq!(args.poll_interval_ms, None);
}

#[test]
fn test_args_list_devices_and_config() {
    let args = Args::parse_from(["test", "--list-devices", "--config", "my.toml"]);
    assert!(args.list_devices);
    assert_eq!(args.config.unwrap().to_str(), Some("my.toml"));
}

#[test]
fn test_format_device_list() {
    let ports = vec![
        PortDetails::new("20:0", "Keystation"),
        PortDetails::new("24:0", "Launchkey"),
    ];
    assert_eq!(
        format_device_list(&ports),
        vec!["  - Keystation [20:0]", "  - Launchkey [24:0]"]
    );
}
