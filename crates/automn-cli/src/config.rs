use std::path::{Path, PathBuf};

use automn_dsl::LexerConfig;
use serde::{Deserialize, Serialize};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// CLI configuration loaded from automn.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub parser: ParserSettings,
    #[serde(default)]
    pub cli: CliSettings,
}

/// Settings forwarded to the lexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserSettings {
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            tab_width: default_tab_width(),
        }
    }
}

/// File discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            extension: default_extension(),
        }
    }
}

fn default_tab_width() -> usize {
    LexerConfig::default().tab_width
}

fn default_source_dir() -> String {
    "schemas/".to_string()
}

fn default_extension() -> String {
    "automn".to_string()
}

/// Discovery order for the config file:
/// 1. `--config <path>` (explicit)
/// 2. `AUTOMN_CONFIG` env var
/// 3. `./automn.toml` (project-local)
/// 4. `$XDG_CONFIG_HOME/automn/config.toml`
/// 5. `~/.config/automn/config.toml`
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig, CliError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }

    if let Ok(env_path) = std::env::var("AUTOMN_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    let local = PathBuf::from("automn.toml");
    if local.exists() {
        return load_config_from_path(&local);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("automn/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config/automn/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    tracing::debug!("no config file found, using defaults");
    Ok(CliConfig::default())
}

fn load_config_from_path(path: &Path) -> Result<CliConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: CliConfig = toml::from_str(&contents).map_err(|e| CliError::Config {
        message: format!("failed to parse {}: {}", path.display(), e),
    })?;
    if config.parser.tab_width == 0 {
        return Err(CliError::Config {
            message: format!("{}: [parser] tab_width must be at least 1", path.display()),
        });
    }
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Settings for one run after merging the config file with CLI flags.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub lexer: LexerConfig,
    pub source_dir: PathBuf,
    pub extension: String,
}

impl Resolved {
    /// Paths given on the command line, or the configured source directory.
    pub fn paths_or_default(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        if paths.is_empty() {
            vec![self.source_dir.clone()]
        } else {
            paths.to_vec()
        }
    }
}

/// CLI flags take precedence over config file values.
pub fn resolve(config: &CliConfig, global: &GlobalOpts) -> Resolved {
    let tab_width = global
        .tab_width
        .map(usize::from)
        .unwrap_or(config.parser.tab_width);
    Resolved {
        lexer: LexerConfig::default().with_tab_width(tab_width),
        source_dir: PathBuf::from(&config.cli.source_dir),
        extension: config.cli.extension.trim_start_matches('.').to_string(),
    }
}
