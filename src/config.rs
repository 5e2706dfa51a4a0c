use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default chat endpoint (a locally running `ledgerchat-proxy`).
fn default_endpoint() -> String {
    "http://127.0.0.1:8787/api/chat".to_string()
}

fn default_finance_file() -> PathBuf {
    PathBuf::from("finance.json")
}

fn default_transcript_file() -> PathBuf {
    PathBuf::from("chat_history.json")
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to data directory. If relative, resolved from config file location.
    /// If not specified, defaults to the config file's directory.
    pub data_dir: Option<PathBuf>,

    /// URL of the chat endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Attach the finance snapshot to chat requests by default.
    pub share_data: bool,

    /// Finance tracker export read for snapshots. Relative to `data_dir`.
    #[serde(default = "default_finance_file")]
    pub finance_file: PathBuf,

    /// Stored chat transcript. Relative to `data_dir`.
    #[serde(default = "default_transcript_file")]
    pub transcript_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            endpoint: default_endpoint(),
            share_data: false,
            finance_file: default_finance_file(),
            transcript_file: default_transcript_file(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the data directory path.
    ///
    /// If `data_dir` is set and relative, it's resolved relative to `config_dir`.
    /// If `data_dir` is not set, returns `config_dir`.
    pub fn resolve_data_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.data_dir {
            Some(data_dir) if data_dir.is_absolute() => data_dir.clone(),
            Some(data_dir) => config_dir.join(data_dir),
            None => config_dir.to_path_buf(),
        }
    }

    fn resolve(self, config_dir: &Path) -> ResolvedConfig {
        let data_dir = self.resolve_data_dir(config_dir);
        ResolvedConfig {
            finance_file: data_dir.join(&self.finance_file),
            transcript_file: data_dir.join(&self.transcript_file),
            data_dir,
            endpoint: self.endpoint,
            share_data: self.share_data,
        }
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The resolved data directory path.
    pub data_dir: PathBuf,

    pub endpoint: String,

    pub share_data: bool,

    pub finance_file: PathBuf,

    pub transcript_file: PathBuf,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./ledgerchat.toml` if it exists in current directory
/// 2. `~/.local/share/ledgerchat/ledgerchat.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("ledgerchat.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("ledgerchat").join("ledgerchat.toml");
    }

    local_config
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    ///
    /// Data paths are resolved relative to the config file's parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        Ok(Config::load(&config_path)?.resolve(config_dir))
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// Without a config file, the file's intended parent directory is the
    /// data directory.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load(config_path);
        }

        let config_path = if config_path.is_relative() {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(config_path)
        } else {
            config_path.to_path_buf()
        };

        let config_dir = config_path
            .parent()
            .context("Config path has no parent directory")?;

        Ok(Config::default().resolve(config_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_data_dir_is_config_dir() {
        let config = Config::default();
        let config_dir = Path::new("/home/user/finances");
        assert_eq!(
            config.resolve_data_dir(config_dir),
            PathBuf::from("/home/user/finances")
        );
    }

    #[test]
    fn test_relative_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("data")),
            ..Default::default()
        };
        let config_dir = Path::new("/home/user/finances");
        assert_eq!(
            config.resolve_data_dir(config_dir),
            PathBuf::from("/home/user/finances/data")
        );
    }

    #[test]
    fn test_absolute_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/var/ledgerchat")),
            ..Default::default()
        };
        let config_dir = Path::new("/home/user/finances");
        assert_eq!(
            config.resolve_data_dir(config_dir),
            PathBuf::from("/var/ledgerchat")
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:8787/api/chat");
        assert!(!config.share_data);
        assert_eq!(config.finance_file, PathBuf::from("finance.json"));
        assert_eq!(config.transcript_file, PathBuf::from("chat_history.json"));
    }

    #[test]
    fn test_load_empty_config() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("ledgerchat.toml");
        std::fs::File::create(&config_path)?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.data_dir, None);
        assert_eq!(config.endpoint, default_endpoint());
        assert!(!config.share_data);

        Ok(())
    }

    #[test]
    fn test_load_config() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("ledgerchat.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "endpoint = \"https://chat.example.com/api/chat\"")?;
        writeln!(file, "share_data = true")?;
        writeln!(file, "finance_file = \"exports/tracker.json\"")?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.endpoint, "https://chat.example.com/api/chat");
        assert!(config.share_data);
        assert_eq!(config.finance_file, PathBuf::from("exports/tracker.json"));
        assert_eq!(config.transcript_file, default_transcript_file());

        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_toml() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("ledgerchat.toml");
        std::fs::write(&config_path, "share_data = \"maybe")?;

        assert!(Config::load(&config_path).is_err());
        Ok(())
    }

    #[test]
    fn test_resolved_config_load_or_default_missing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("ledgerchat.toml");

        let resolved = ResolvedConfig::load_or_default(&config_path)?;
        assert_eq!(resolved.data_dir, dir.path());
        assert_eq!(resolved.finance_file, dir.path().join("finance.json"));
        assert_eq!(resolved.transcript_file, dir.path().join("chat_history.json"));

        Ok(())
    }

    #[test]
    fn test_resolved_config_resolves_relative_paths() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("ledgerchat.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "data_dir = \"./data\"")?;
        writeln!(file, "transcript_file = \"history/chat.json\"")?;

        let resolved = ResolvedConfig::load(&config_path)?;
        let data_dir = dir.path().canonicalize()?.join("./data");
        assert_eq!(resolved.data_dir, data_dir);
        assert_eq!(
            resolved.transcript_file,
            data_dir.join("history/chat.json")
        );

        Ok(())
    }
}
