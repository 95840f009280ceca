//! Configuration for normalize-schemagen.
//!
//! Loads config from:
//! 1. Global: ~/.config/normalize/schemagen.toml
//! 2. Per-project: .normalize/schemagen.toml (overrides global)
//!
//! Example schemagen.toml:
//! ```toml
//! [output]
//! backend = "zod"
//! export = true
//! infer_types = true
//! schema_suffix = "Schema"
//! import_path = "zod"
//! ```

use normalize_schemagen::EmitOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Backend used when neither the command line nor a config file picks one.
pub const DEFAULT_BACKEND: &str = "zod";

/// Output configuration. Unset fields fall back to the backend defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Backend name (zod, json).
    pub backend: Option<String>,
    /// Prefix each definition with `export`.
    pub export: Option<bool>,
    /// Emit an inferred type alias next to each schema.
    pub infer_types: Option<bool>,
    /// Suffix appended to schema identifiers.
    pub schema_suffix: Option<String>,
    /// Module the schema library is imported from.
    pub import_path: Option<String>,
}

impl OutputConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            backend: other.backend.or(self.backend),
            export: other.export.or(self.export),
            infer_types: other.infer_types.or(self.infer_types),
            schema_suffix: other.schema_suffix.or(self.schema_suffix),
            import_path: other.import_path.or(self.import_path),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct SchemagenConfig {
    pub output: OutputConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl SchemagenConfig {
    /// Load configuration for a project.
    ///
    /// Loads global config from ~/.config/normalize/schemagen.toml,
    /// then merges with per-project config from .normalize/schemagen.toml.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_layers(Self::global_config_path().as_deref(), root)
    }

    fn load_layers(global: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(global) = global.map(Self::load_file).transpose()?.flatten() {
            config = config.merge(global);
        }

        if let Some(project) = Self::load_file(&Self::project_config_path(root))? {
            config = config.merge(project);
        }

        Ok(config)
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("normalize").join("schemagen.toml"))
    }

    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(".normalize").join("schemagen.toml")
    }

    /// Load config from a file path. A missing file is not an error.
    fn load_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Some(config))
    }

    /// Merge another config into this one. Fields set in `other` win.
    fn merge(self, other: Self) -> Self {
        Self {
            output: self.output.merge(other.output),
        }
    }

    pub fn backend(&self) -> &str {
        self.output.backend.as_deref().unwrap_or(DEFAULT_BACKEND)
    }

    pub fn emit_options(&self) -> EmitOptions {
        let defaults = EmitOptions::default();
        EmitOptions {
            export: self.output.export.unwrap_or(defaults.export),
            infer_types: self.output.infer_types.unwrap_or(defaults.infer_types),
            schema_suffix: self
                .output
                .schema_suffix
                .clone()
                .unwrap_or(defaults.schema_suffix),
            import_path: self
                .output
                .import_path
                .clone()
                .unwrap_or(defaults.import_path),
        }
    }
}
