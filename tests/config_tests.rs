use camscout::config::{ScanConfig, ScanMode};
use camscout::db::registry;
use camscout::errors::ScanError;
use test_utils::write_temp_file;


fn search_config() -> ScanConfig {
    ScanConfig {
        api_key: Some("test-key".to_string()),
        ..ScanConfig::default()
    }
}

#[test]
fn default_search_config_with_key_validates() {
    assert!(search_config().validate().is_ok());
}

#[test]
fn zero_workers_is_fatal() {
    let config = ScanConfig {
        workers: 0,
        ..search_config()
    };
    assert!(matches!(config.validate(), Err(ScanError::Config(_))));
}

#[test]
fn search_mode_requires_an_api_key() {
    let config = ScanConfig {
        api_key: None,
        ..ScanConfig::default()
    };
    assert!(matches!(config.validate(), Err(ScanError::Config(_))));
}

#[test]
fn country_must_be_two_letters() {
    let config = ScanConfig {
        country: Some("USA".to_string()),
        ..search_config()
    };
    assert!(matches!(config.validate(), Err(ScanError::Config(_))));

    let config = ScanConfig {
        country: Some("US".to_string()),
        ..search_config()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn import_mode_requires_an_existing_input_file() {
    let config = ScanConfig {
        mode: ScanMode::Import,
        input_file: None,
        ..ScanConfig::default()
    };
    assert!(matches!(config.validate(), Err(ScanError::Config(_))));

    let config = ScanConfig {
        mode: ScanMode::Import,
        input_file: Some("/nonexistent/camscout-input.jsonl".into()),
        ..ScanConfig::default()
    };
    assert!(matches!(config.validate(), Err(ScanError::Config(_))));

    let path = write_temp_file("config-input.jsonl", "");
    let config = ScanConfig {
        mode: ScanMode::Import,
        input_file: Some(path),
        ..ScanConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn registry_resolves_known_types_case_insensitively() {
    let foscam = registry::lookup("foscam").unwrap();
    assert_eq!(foscam.default_username, "admin");
    assert_eq!(foscam.server_header_marker.as_deref(), Some("netwave"));

    let also_foscam = registry::lookup("FosCam").unwrap();
    assert_eq!(also_foscam.name, foscam.name);
}

#[test]
fn unknown_camera_type_is_fatal() {
    assert!(matches!(
        registry::lookup("definitely-not-a-camera"),
        Err(ScanError::UnknownCameraType(_))
    ));
}
