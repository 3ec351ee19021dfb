use crate::error::{StoreError, StoreErrorExt};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Prefix of environment overrides, e.g. `STOREMOD__STRICT=false`.
pub const ENV_PREFIX: &str = "STOREMOD";

/// Behavior switches of a [`crate::Store`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Unknown operation keys are errors. When off, they are logged and ignored.
    pub strict: bool,
    /// Enables operation tracing for modules built with [`crate::Store::tracer`].
    pub debug: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { strict: true, debug: false }
    }
}

/// Loads configuration from an optional file, overlaid with `STOREMOD__` environment variables.
///
/// The file format follows the extension (`.toml`, `.json`, `.yaml`, ...). Nested keys use a
/// double underscore in the environment: `STOREMOD__LOG__LEVEL` maps to `log.level`.
///
/// # Errors
/// Returns [`StoreError::Config`] if a given file is missing or unreadable, or if the merged
/// values do not deserialize into `T`.
///
/// # Example
/// ```rust,no_run
/// use storemod_store::{StoreConfig, load_config};
///
/// let config: StoreConfig = load_config(Some("store.toml")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, StoreError>
where
    T: DeserializeOwned,
{
    let environment = Environment::with_prefix(ENV_PREFIX).separator("__").convert_case(config::Case::Snake);
    load_layered(path.as_ref().map(AsRef::<Path>::as_ref), environment)
}

fn load_layered<T>(path: Option<&Path>, environment: Environment) -> Result<T, StoreError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();
    if let Some(path) = path {
        info!("Loading config from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(environment)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
