//! Configuration file support for ridilint
//!
//! Loads `.ridilint.toml` from the current directory or parent
//! directories. The binary only lints when a rule file is configured;
//! phpcs merging additionally needs the PHP binary and the phpcs script.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub php: PhpConfig,
    pub phpcs: PhpcsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Path to the JSON rule file. Absent means "not configured, stay
    /// silent".
    pub file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PhpConfig {
    /// PHP interpreter used to run phpcs.
    pub binary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PhpcsConfig {
    /// Path to the phpcs script whose output we merge into.
    pub script: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Path of the debug log file; logging is off when absent.
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load config from `.ridilint.toml` searching from the current
    /// directory upward.
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward.
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(".ridilint.toml");
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".ridilint.toml");
        fs::write(
            &path,
            r#"
[rules]
file = "/etc/ridilint/rules.json"

[php]
binary = "php"

[phpcs]
script = "/usr/local/bin/phpcs"

[log]
file = "/tmp/ridilint.log"
"#,
        )
        .unwrap();

        let config = Config::load_path(&path).unwrap();
        assert_eq!(
            config.rules.file.as_deref(),
            Some(Path::new("/etc/ridilint/rules.json"))
        );
        assert_eq!(config.php.binary.as_deref(), Some("php"));
        assert_eq!(
            config.phpcs.script.as_deref(),
            Some(Path::new("/usr/local/bin/phpcs"))
        );
        assert_eq!(config.log.file.as_deref(), Some(Path::new("/tmp/ridilint.log")));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".ridilint.toml");
        fs::write(&path, "").unwrap();

        let config = Config::load_path(&path).unwrap();
        assert!(config.rules.file.is_none());
        assert!(config.php.binary.is_none());
    }

    #[test]
    fn test_upward_search_finds_parent_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".ridilint.toml"), "[rules]\nfile = \"r.json\"\n").unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let found = Config::load_from(nested).unwrap();
        let (config, path) = found.unwrap();
        assert_eq!(path, dir.path().join(".ridilint.toml"));
        assert_eq!(config.rules.file.as_deref(), Some(Path::new("r.json")));
    }

    #[test]
    fn test_no_config_found() {
        let dir = tempfile::tempdir().unwrap();
        // note: the search walks up to the filesystem root, so this only
        // holds as long as no ancestor carries a config file
        let found = Config::load_from(dir.path().to_path_buf()).unwrap();
        assert!(found.is_none());
    }
}
