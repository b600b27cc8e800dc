use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub registry: RegistrySettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for the topic registry.
///
/// `default_level` is the level requested for subscriptions that do not name
/// one. `deny_prefixes` lists canonical title prefixes no client may
/// subscribe to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RegistrySettings {
    pub default_level: u8,
    pub check_exists: bool,
    pub deny_prefixes: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub registry: Option<PartialRegistrySettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialRegistrySettings {
    pub default_level: Option<u8>,
    pub check_exists: Option<bool>,
    pub deny_prefixes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry: RegistrySettings {
                default_level: 0,
                check_exists: false,
                deny_prefixes: Vec::new(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}
