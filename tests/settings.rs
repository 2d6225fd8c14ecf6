use std::fs;
use std::path::PathBuf;

use munch::{MunchError, Settings};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
    fs::write(&path, contents).expect("temp file is writable");
    path
}

#[test]
fn defaults_without_a_file() {
    let defaults = Settings::default();
    assert_eq!(defaults.separator, ".");
    assert!(!defaults.yaml_tagged);
    assert_eq!(defaults.json_indent, None);
    assert_eq!(defaults.log_level, "info");
}

#[test]
fn file_overrides_defaults() {
    let path = temp_file(
        "munch-settings.toml",
        "separator = \"/\"\nyaml_tagged = true\njson_indent = 4\n",
    );
    let settings = Settings::load(path.to_str()).expect("loads");
    fs::remove_file(&path).ok();
    assert_eq!(settings.separator, "/");
    assert!(settings.yaml_tagged);
    assert_eq!(settings.json_indent, Some(4));
    // untouched keys keep their defaults
    assert_eq!(settings.log_level, "info");
}

#[test]
fn yaml_files_are_read_too() {
    let path = temp_file("munch-settings.yaml", "separator: \"__\"\nlog_level: debug\n");
    let settings = Settings::load(path.to_str()).expect("loads");
    fs::remove_file(&path).ok();
    assert_eq!(settings.separator, "__");
    assert_eq!(settings.log_level, "debug");
}

#[test]
fn a_named_file_must_exist() {
    let missing = std::env::temp_dir().join("no-such-munch-settings.toml");
    let result = Settings::load(missing.to_str());
    assert!(matches!(result, Err(MunchError::Config(_))));
}
