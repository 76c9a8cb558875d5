//! Locating and loading the configuration file.
//!
//! Lookup order:
//!
//! 1. `--config` (explicit path, used as given)
//! 2. `unstable-lint.toml` or `.unstable-lint.toml` in the checked directory
//!    or its nearest ancestor, stopping at the repository root (`.git`)
//! 3. `$UNSTABLE_LINT_CONFIG_DIR/config.toml`, else `~/.unstable-lint/config.toml`
//! 4. built-in defaults
//!
//! The file is parsed once. Its text is kept alongside the parsed [`Config`]
//! because `[[restricted]]` tables are read by the rules crate.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use unstable_lint_core::Config;

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` flag.
    Explicit(PathBuf),
    /// The checked directory or one of its ancestors.
    Project(PathBuf),
    /// The global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// A parsed configuration and where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    /// Where the file was found.
    pub source: ConfigSource,
    /// Parsed settings.
    pub config: Config,
    /// Raw file text; empty for defaults.
    pub content: String,
}

impl LoadedConfig {
    /// Finds and parses the configuration that applies to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved file cannot be read or parsed.
    pub fn load(target: &Path, explicit: Option<&Path>) -> Result<Self> {
        Self::read(resolve(target, explicit, global_config_dir()))
    }

    /// Overrides the config file's `preset` (the `--preset` flag).
    #[must_use]
    pub fn with_preset(mut self, preset: Option<String>) -> Self {
        if preset.is_some() {
            self.config.preset = preset;
        }
        self
    }

    fn read(source: ConfigSource) -> Result<Self> {
        let Some(path) = source.path().map(Path::to_path_buf) else {
            return Ok(Self {
                source,
                config: Config::default(),
                content: String::new(),
            });
        };

        match &source {
            ConfigSource::Global(_) => tracing::info!("Using global config: {}", path.display()),
            _ => tracing::debug!("Using config: {}", path.display()),
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Config::parse(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        Ok(Self {
            source,
            config,
            content,
        })
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["unstable-lint.toml", ".unstable-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the config file for `target`. `global_dir` is a parameter so
/// tests need no env vars.
fn resolve(target: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(&absolute(target)) {
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// Searches `start` and its ancestors; a directory holding `.git` is the
/// last one searched.
fn find_project_config(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        for name in PROJECT_CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

/// `$UNSTABLE_LINT_CONFIG_DIR`, else `~/.unstable-lint/`.
fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("UNSTABLE_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".unstable-lint"))
}
