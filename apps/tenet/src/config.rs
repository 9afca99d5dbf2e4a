//! # Configuration
//!
//! Optional TOML file plus command-line overrides.
//!
//! ```toml
//! mode = "flat"
//! preload = ["rules/base.dl", "facts/seed.dl"]
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! ```
//!
//! Every key is optional. Flags given on the command line win over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tenet_core::primitives::MAX_PROGRAM_LENGTH;
use tenet_core::{Bridge, OutputMode, TenetError};

/// Maximum size of a configuration file (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

// =============================================================================
// CONFIG STRUCTURE
// =============================================================================

/// HTTP bind address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Deployment configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Result encoding for every query of this deployment.
    pub mode: OutputMode,
    /// Program files loaded, in order, before the host accepts calls.
    pub preload: Vec<PathBuf>,
    pub server: ServerConfig,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, TenetError> {
        toml::from_str(text).map_err(|e| TenetError::Program(format!("invalid config: {}", e)))
    }

    /// Read and parse a configuration file.
    ///
    /// Relative `preload` paths are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, TenetError> {
        let text = read_bounded(path, MAX_CONFIG_FILE_SIZE)?;
        let mut config = Self::from_toml_str(&text)?;

        if let Some(dir) = path.parent() {
            for entry in &mut config.preload {
                if entry.is_relative() {
                    *entry = dir.join(&*entry);
                }
            }
        }
        Ok(config)
    }

    /// Apply command-line values on top of the file.
    ///
    /// `--load` files are appended after the configured preload list.
    pub fn apply_overrides(&mut self, mode: Option<OutputMode>, load: &[PathBuf]) {
        if let Some(mode) = mode {
            self.mode = mode;
        }
        self.preload.extend(load.iter().cloned());
    }

    /// Build a bridge and load every preload file into it.
    pub fn build_bridge(&self) -> Result<Bridge, TenetError> {
        let mut bridge = Bridge::new(self.mode);
        for path in &self.preload {
            preload_file(&mut bridge, path)?;
        }
        Ok(bridge)
    }
}

// =============================================================================
// FILE LOADING
// =============================================================================

/// Read a regular file no larger than `max_size` bytes.
fn read_bounded(path: &Path, max_size: u64) -> Result<String, TenetError> {
    let canonical = path.canonicalize().map_err(|e| {
        TenetError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;
    if !canonical.is_file() {
        return Err(TenetError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| TenetError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > max_size {
        return Err(TenetError::InputTooLarge {
            what: "file",
            len: metadata.len() as usize,
            max: max_size as usize,
        });
    }

    std::fs::read_to_string(&canonical)
        .map_err(|e| TenetError::IoError(format!("Cannot read '{}': {}", path.display(), e)))
}

/// Define the contents of one program file.
pub fn preload_file(bridge: &mut Bridge, path: &Path) -> Result<(), TenetError> {
    let text = read_bounded(path, MAX_PROGRAM_LENGTH as u64)?;
    bridge
        .try_define(&[text])
        .map_err(|e| TenetError::Program(format!("{}: {}", path.display(), e)))?;
    tracing::info!("Loaded {}", path.display());
    crate::trace_output(bridge);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_default() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.server.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn full_file() {
        let config = Config::from_toml_str(
            r#"
            mode = "flat"
            preload = ["a.dl"]

            [server]
            host = "0.0.0.0"
            port = 9000
            "#,
        )
        .expect("parse");
        assert_eq!(config.mode, OutputMode::Flat);
        assert_eq!(config.preload, vec![PathBuf::from("a.dl")]);
        assert_eq!(config.server.addr(), "0.0.0.0:9000");
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(Config::from_toml_str("colour = \"red\"").is_err());
        assert!(Config::from_toml_str("mode = \"xml\"").is_err());
    }

    #[test]
    fn overrides_win() {
        let mut config = Config::from_toml_str("mode = \"flat\"\npreload = [\"a.dl\"]")
            .expect("parse");
        config.apply_overrides(Some(OutputMode::Structured), &[PathBuf::from("b.dl")]);
        assert_eq!(config.mode, OutputMode::Structured);
        assert_eq!(
            config.preload,
            vec![PathBuf::from("a.dl"), PathBuf::from("b.dl")]
        );
    }

    #[test]
    fn preload_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("facts.dl"), "edge(1,2).\n").expect("write");
        let config_path = dir.path().join("tenet.toml");
        std::fs::write(&config_path, "mode = \"flat\"\npreload = [\"facts.dl\"]\n")
            .expect("write");

        let config = Config::from_file(&config_path).expect("config");
        let bridge = config.build_bridge().expect("bridge");
        assert_eq!(bridge.query(&["edge(X,Y)"]), "edge(1,2)");
    }

    #[test]
    fn bad_preload_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "edge(1,").expect("write");

        let config = Config {
            preload: vec![file.path().to_path_buf()],
            ..Config::default()
        };
        let err = config.build_bridge().expect_err("must fail");
        assert!(err.to_string().contains("syntax error"), "{}", err);
        assert!(
            err.to_string()
                .contains(&file.path().display().to_string())
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).expect_err("missing");
        assert!(matches!(err, TenetError::IoError(_)));
    }
}
