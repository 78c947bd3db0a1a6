//! Layered configuration.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`cyclelog.toml` shipped with the crate)
//! 2. `~/.config/cyclelog/cyclelog.toml`
//! 3. `./cyclelog.toml`
//! 4. `CYCLELOG_*` environment variables (`__` separates nested keys)

use cyclelog_cache::MetadataCacheConfig;
use cyclelog_error::{ConfigError, CyclelogError, CyclelogResult};
use cyclelog_metrics::UtilizationConfig;
use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../cyclelog.toml");

/// Top-level Cyclelog configuration.
///
/// # Example
///
/// ```no_run
/// use cyclelog::CyclelogConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CyclelogConfig::load()?;
/// println!("Reading logs from {}", config.data_root().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Getters)]
pub struct CyclelogConfig {
    /// Directory holding the metadata tables and machine directories
    #[serde(default = "default_data_root")]
    data_root: PathBuf,

    /// Days before today covered by a range query without dates
    #[serde(default = "default_range_days")]
    default_range_days: u64,

    /// Metadata cache settings
    #[serde(default)]
    cache: MetadataCacheConfig,

    /// Capacity used for utilization
    #[serde(default)]
    utilization: UtilizationConfig,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_range_days() -> u64 {
    7
}

impl Default for CyclelogConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            default_range_days: default_range_days(),
            cache: MetadataCacheConfig::default(),
            utilization: UtilizationConfig::default(),
        }
    }
}

impl CyclelogConfig {
    /// Load with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a present source fails to parse or the
    /// merged values are invalid.
    #[instrument]
    pub fn load() -> CyclelogResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/cyclelog/cyclelog.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("cyclelog").required(false))
            .add_source(environment());

        Self::finish(builder)
    }

    /// Load a single explicit file, with environment overrides on top.
    ///
    /// Keys missing from the file take their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> CyclelogResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment());

        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> CyclelogResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                CyclelogError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CyclelogError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero utilization capacity.
    pub fn validate(&self) -> CyclelogResult<()> {
        self.utilization.validate()
    }

    /// Replace the data root.
    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    /// Replace the default window length.
    pub fn with_default_range_days(mut self, days: u64) -> Self {
        self.default_range_days = days;
        self
    }

    /// Replace the cache settings.
    pub fn with_cache(mut self, cache: MetadataCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the utilization capacity.
    pub fn with_utilization(mut self, utilization: UtilizationConfig) -> Self {
        self.utilization = utilization;
        self
    }
}

fn environment() -> Environment {
    Environment::with_prefix("CYCLELOG")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
