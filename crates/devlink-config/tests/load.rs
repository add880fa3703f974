use devlink_config::{ConfigError, DevlinkConfig};
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [codec]
        max_tables = 256
        builder_capacity = 256

        [transport]
        max_frame_size = 8192
        "#
    )
    .unwrap();

    let config = DevlinkConfig::load(file.path()).unwrap();
    assert_eq!(config.codec.max_tables, 256);
    assert_eq!(config.codec.max_depth, 64);
    assert_eq!(config.transport.max_frame_size, 8192);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = DevlinkConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}
