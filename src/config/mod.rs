mod settings;

use std::path::Path;

use config::{Config, Environment, File};

use crate::config::settings::PartialSettings;
use crate::utils::Result;

pub use settings::{BrokerSettings, LogSettings, RelaySettings, ServerSettings, Settings};

/// Environment variables are read as `BRIDGE_<SECTION>__<KEY>`,
/// e.g. `BRIDGE_BROKER__HOST` or `BRIDGE_RELAY__COMMAND_TOPIC`.
const ENV_PREFIX: &str = "BRIDGE";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
pub fn load_config() -> Result<Settings> {
    load_with(File::with_name("config/default").required(false))
}

/// Same as [`load_config`] but reads the given file, which must exist.
pub fn load_config_from(path: &Path) -> Result<Settings> {
    load_with(File::from(path).required(true))
}

fn load_with<S>(file: S) -> Result<Settings>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = Config::builder().add_source(file).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}

#[cfg(test)]
mod tests;
