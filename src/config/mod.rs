mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{LoggingSettings, RegistrySettings, Settings};

/// Prefix of environment variables read by `load_config`, e.g.
/// `TOPICREG__REGISTRY__DEFAULT_LEVEL=1`.
pub const ENV_PREFIX: &str = "TOPICREG";

/// Loads the configuration from `config/default` and the environment, then
/// merges it over the default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("registry.deny_prefixes")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        registry: RegistrySettings {
            default_level: partial
                .registry
                .as_ref()
                .and_then(|r| r.default_level)
                .unwrap_or(default.registry.default_level),
            check_exists: partial
                .registry
                .as_ref()
                .and_then(|r| r.check_exists)
                .unwrap_or(default.registry.check_exists),
            deny_prefixes: partial
                .registry
                .as_ref()
                .and_then(|r| r.deny_prefixes.clone())
                .unwrap_or(default.registry.deny_prefixes),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    })
}
