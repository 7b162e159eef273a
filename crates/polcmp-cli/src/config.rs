use std::fs;
use std::path::Path;

use anyhow::{ensure, Context};
use polcmp_compare::CompareOptions;
use polcmp_flatten::{FlattenConfig, ShapeSelection, DEFAULT_MAX_DEPTH};
use polcmp_types::KeyAddressingMode;
use serde::{Deserialize, Serialize};

use crate::cli::EngineArgs;

/// Settings for one `polcmp` run, loadable from a TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    pub addressing: KeyAddressingMode,
    pub shape: ShapeSelection,
    pub delimiter: char,
    pub max_depth: usize,
    /// Keys dropped before classification, on top of the built-in ones.
    pub extra_ignored_keys: Vec<String>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            addressing: KeyAddressingMode::LastSegment,
            shape: ShapeSelection::Auto,
            delimiter: '_',
            max_depth: DEFAULT_MAX_DEPTH,
            extra_ignored_keys: Vec::new(),
        }
    }
}

impl CompareConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// The file at `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.max_depth > 0, "max_depth must be at least 1");
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, args: &EngineArgs) -> Self {
        if let Some(addressing) = args.addressing {
            self.addressing = addressing.into();
        }
        if let Some(shape) = args.shape {
            self.shape = shape.into();
        }
        self
    }

    pub fn flatten_config(&self) -> FlattenConfig {
        FlattenConfig {
            addressing: self.addressing,
            delimiter: self.delimiter,
            max_depth: self.max_depth,
            shape: self.shape,
        }
    }

    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            extra_ignored_keys: self.extra_ignored_keys.clone(),
        }
    }
}
