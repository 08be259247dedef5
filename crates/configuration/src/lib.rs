use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnalysisSettings, ChartSettings, Config, DataSettings, FetchSettings, LoggingSettings,
};

/// Name (without extension) of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "driftscope";

/// Prefix of environment variables that override file values, e.g. `DRIFTSCOPE__ANALYSIS__MAX_LAG`.
pub const ENV_PREFIX: &str = "DRIFTSCOPE";

/// Loads the application configuration.
///
/// Values are layered: built-in defaults, then the TOML file, then environment variables.
/// When `path` is `None` the file `driftscope.toml` is optional; an explicit path must exist.
/// The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!("Configuration loaded: {:?}", config);
    Ok(config)
}
