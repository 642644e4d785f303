// tests/config_test.rs
use release_pipeline::config::{load_config, Config};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.release_branch, "main");
    assert_eq!(config.remote, "origin");
    assert_eq!(config.manifest_path, PathBuf::from("Cargo.toml"));
    assert_eq!(config.tools.required, vec!["cargo"]);
    assert_eq!(config.messages.commit, "chore: release v{version}");
    assert_eq!(config.publish.registry, None);

    let gates: Vec<_> = config.gates.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(gates, vec!["test", "fmt", "clippy", "doc"]);
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
release_branch = "release"
remote = "upstream"
manifest_path = "crates/core/Cargo.toml"

[tools]
required = ["cargo", "git"]

[messages]
commit = "release: {version}"

[[gates]]
name = "test"
command = ["cargo", "nextest", "run"]

[[gates]]
name = "deny"
command = ["cargo", "deny", "check"]

[publish]
registry = "internal"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.release_branch, "release");
    assert_eq!(config.remote, "upstream");
    assert_eq!(config.manifest_path, PathBuf::from("crates/core/Cargo.toml"));
    assert_eq!(config.tools.required, vec!["cargo", "git"]);
    assert_eq!(config.messages.commit, "release: {version}");
    assert_eq!(config.messages.tag, "Release v{version}");
    assert_eq!(config.gates.len(), 2);
    assert_eq!(config.gates[1].command_line(), "cargo deny check");
    assert_eq!(config.publish.registry.as_deref(), Some("internal"));
}

#[test]
fn test_invalid_file_is_rejected() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"release_branch = \"\"\n").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert_eq!(err.category(), "ConfigError");
    assert!(err.to_string().contains("release_branch"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let err = load_config(Some("/nonexistent/release.toml")).unwrap_err();
    assert!(err.to_string().contains("cannot read"));
}
