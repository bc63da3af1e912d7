//! Config discovery and loading from disk.

use convoy::Parser;
use std::fs;

#[test]
fn test_find_config_in_parent_directory() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("convoy.yaml");
    fs::write(&config_path, "services: []").expect("Failed to write config");

    let nested = temp_dir.path().join("a").join("b");
    fs::create_dir_all(&nested).expect("Failed to create nested dirs");

    let found = Parser::find_config_in_dir(&nested).expect("Should find config in ancestor");
    assert_eq!(found, config_path);
}

#[test]
fn test_find_config_alternate_extension() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("convoy.yml");
    fs::write(&config_path, "services: []").expect("Failed to write config");

    let found = Parser::find_config_in_dir(temp_dir.path()).expect("Should find .yml config");
    assert_eq!(found, config_path);
}

#[test]
fn test_load_config_from_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("convoy.yaml");

    let content = r#"
supervisor:
  listen_port: 9100
  open_browser: false

services:
  - identifier: svc_a
    display_name: Service A
    working_directory: services/a
    port: 9001
    command: ["./run.sh", "--port", "{{port}}"]
"#;
    fs::write(&config_path, content).expect("Failed to write config");

    let config = Parser::new()
        .load_config(&config_path)
        .expect("Config should load");
    assert_eq!(config.supervisor.listen_port, 9100);
    assert!(!config.supervisor.open_browser);
    assert_eq!(config.services.len(), 1);
    assert_eq!(config.services[0].port, 9001);
}

#[test]
fn test_load_config_missing_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("convoy.yaml");
    assert!(Parser::new().load_config(&missing).is_err());
}
