// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Parses the poll interval and checks the glob patterns.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}

/// Parse and validate config text that is already in memory.
pub fn load_from_str(contents: &str) -> Result<ConfigFile> {
    let raw_config: RawConfigFile = toml::from_str(contents)?;
    ConfigFile::try_from(raw_config)
}

/// `Autoreload.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Autoreload.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AutoreloadError;

    #[test]
    fn load_and_validate_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Autoreload.toml");
        fs::write(
            &path,
            "[watch]\npoll_interval = \"250ms\"\n\n[images]\ninclude = [\"*.png\"]\n",
        )
        .unwrap();

        let cfg = load_and_validate(&path).unwrap();
        assert_eq!(cfg.poll_interval(), std::time::Duration::from_millis(250));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_and_validate(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, AutoreloadError::IoError(_)));
    }

    #[test]
    fn malformed_toml_is_a_toml_error() {
        let err = load_from_str("[watch\npoll_interval = 1").unwrap_err();
        assert!(matches!(err, AutoreloadError::TomlError(_)));
    }
}
