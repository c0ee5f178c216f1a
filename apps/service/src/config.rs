use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::registry::EndpointRegistry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write config file: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no usable config directory (set XDG_CONFIG_HOME or HOME)")]
    PathUnavailable,
}

/// Probe timing preferences
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Milliseconds between probe cycle starts
    pub interval_ms: u64,
    /// Per-probe timeout handed to the prober, in seconds
    pub timeout_seconds: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { interval_ms: 3000, timeout_seconds: 1 }
    }
}

/// Persisted service state: the watch list plus the auto-start flag.
///
/// Targets are stored as their display strings and re-validated through the
/// registry's add path on load, so a stale or hand-edited file can never
/// smuggle an invalid or duplicate endpoint into the watch list.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auto_start: bool,
    /// Unix timestamp of the last save, for troubleshooting stale snapshots
    pub saved_at: Option<i64>,
    pub targets: Vec<String>,
    pub preferences: Preferences,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/netpulse/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::PathUnavailable);
    };

    Ok(path.join("netpulse/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Monitoring")?;
        write_1(f, "Auto-Start", &self.auto_start)?;
        write_1(f, "Interval (ms)", &self.preferences.interval_ms)?;
        write_1(f, "Timeout (s)", &self.preferences.timeout_seconds)?;
        write_title_1(f, "Targets")?;
        for target in &self.targets {
            write_1(f, "Target", target)?;
        }

        Ok(())
    }
}

impl Config {
    /// Resolve the config file path: the given override (with a `.toml`
    /// extension enforced) or the default XDG location.
    pub fn resolve_path(
        optional_path: Option<&path::Path>,
    ) -> Result<path::PathBuf, ConfigError> {
        match optional_path {
            Some(path) => Ok(normalize_toml_path(path)),
            None => default_config_path(),
        }
    }

    /// Generate Config structure from file
    ///
    /// Creates a default config at the path if one does not exist.
    pub fn from_config(optional_path: Option<&path::Path>) -> Result<Self, ConfigError> {
        let config_path = Self::resolve_path(optional_path)?;

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Load the config, falling back to defaults when the file is missing or
    /// unusable. A malformed snapshot is reported and ignored, never fatal.
    pub fn load_or_default(path: &path::Path) -> Self {
        match Self::from_config(Some(path)) {
            Ok(config) => config,
            Err(error) => {
                warn!("Could not use saved configuration ({error}); starting clean");
                Self::default()
            }
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }

        fs::write(path, config_str).map_err(ConfigError::Write)
    }

    /// Feed every saved target through the registry's add path, skipping
    /// entries that fail validation, duplicate an existing host, or exceed
    /// capacity. Returns how many targets were loaded.
    pub fn apply_targets(&self, registry: &mut EndpointRegistry) -> usize {
        let mut loaded = 0;
        for raw in &self.targets {
            match registry.add(raw) {
                Ok(_) => loaded += 1,
                Err(error) => warn!("Skipping saved target {raw:?}: {error}"),
            }
        }

        if loaded > 0 {
            info!("Loaded {loaded} targets from configuration");
        }
        loaded
    }

    /// Snapshot the current watch list for persistence.
    pub fn capture(
        registry: &EndpointRegistry,
        auto_start: bool,
        preferences: Preferences,
    ) -> Self {
        Self {
            auto_start,
            saved_at: Some(chrono::Utc::now().timestamp()),
            targets: registry.list().iter().map(|e| e.display().to_string()).collect(),
            preferences,
        }
    }
}
