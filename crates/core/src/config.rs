use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub salesforce: SalesforceConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct SalesforceConfig {
    pub login_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub api_version: String,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    /// Honor per-line `Discount__c` overrides when pricing quote lines.
    pub discount_overrides_enabled: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub salesforce_login_url: Option<String>,
    pub salesforce_client_id: Option<String>,
    pub salesforce_client_secret: Option<String>,
    pub salesforce_api_version: Option<String>,
    pub discount_overrides_enabled: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            salesforce: SalesforceConfig {
                login_url: "https://login.salesforce.com".to_string(),
                client_id: String::new(),
                client_secret: String::new().into(),
                api_version: "v61.0".to_string(),
            },
            pricing: PricingConfig { discount_overrides_enabled: false },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("quoteforge.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(salesforce) = patch.salesforce {
            if let Some(login_url) = salesforce.login_url {
                self.salesforce.login_url = login_url;
            }
            if let Some(client_id) = salesforce.client_id {
                self.salesforce.client_id = client_id;
            }
            if let Some(client_secret_value) = salesforce.client_secret {
                self.salesforce.client_secret = secret_value(client_secret_value);
            }
            if let Some(api_version) = salesforce.api_version {
                self.salesforce.api_version = api_version;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(discount_overrides_enabled) = pricing.discount_overrides_enabled {
                self.pricing.discount_overrides_enabled = discount_overrides_enabled;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("QUOTEFORGE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("QUOTEFORGE_SERVER_PORT") {
            self.server.port = parse_u16("QUOTEFORGE_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("QUOTEFORGE_SALESFORCE_LOGIN_URL") {
            self.salesforce.login_url = value;
        }
        if let Some(value) = read_env("QUOTEFORGE_SALESFORCE_CLIENT_ID") {
            self.salesforce.client_id = value;
        }
        if let Some(value) = read_env("QUOTEFORGE_SALESFORCE_CLIENT_SECRET") {
            self.salesforce.client_secret = secret_value(value);
        }
        if let Some(value) = read_env("QUOTEFORGE_SALESFORCE_API_VERSION") {
            self.salesforce.api_version = value;
        }

        if let Some(value) = read_env("QUOTEFORGE_PRICING_DISCOUNT_OVERRIDES_ENABLED") {
            self.pricing.discount_overrides_enabled =
                parse_bool("QUOTEFORGE_PRICING_DISCOUNT_OVERRIDES_ENABLED", &value)?;
        }

        let log_level =
            read_env("QUOTEFORGE_LOGGING_LEVEL").or_else(|| read_env("QUOTEFORGE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("QUOTEFORGE_LOGGING_FORMAT").or_else(|| read_env("QUOTEFORGE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(login_url) = overrides.salesforce_login_url {
            self.salesforce.login_url = login_url;
        }
        if let Some(client_id) = overrides.salesforce_client_id {
            self.salesforce.client_id = client_id;
        }
        if let Some(client_secret) = overrides.salesforce_client_secret {
            self.salesforce.client_secret = secret_value(client_secret);
        }
        if let Some(api_version) = overrides.salesforce_api_version {
            self.salesforce.api_version = api_version;
        }
        if let Some(discount_overrides_enabled) = overrides.discount_overrides_enabled {
            self.pricing.discount_overrides_enabled = discount_overrides_enabled;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_salesforce(&self.salesforce)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("quoteforge.toml"), PathBuf::from("config/quoteforge.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_salesforce(salesforce: &SalesforceConfig) -> Result<(), ConfigError> {
    let login_url = salesforce.login_url.trim();
    if !login_url.starts_with("http://") && !login_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "salesforce.login_url must start with http:// or https://".to_string(),
        ));
    }

    if salesforce.client_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "salesforce.client_id is required. Get it from your connected app's Consumer Key"
                .to_string(),
        ));
    }

    if salesforce.client_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "salesforce.client_secret is required. Get it from your connected app's Consumer Secret"
                .to_string(),
        ));
    }

    let api_version = salesforce.api_version.trim();
    let well_formed = api_version
        .strip_prefix('v')
        .map(|rest| rest.chars().all(|ch| ch.is_ascii_digit() || ch == '.'))
        .unwrap_or(false);
    if !well_formed {
        return Err(ConfigError::Validation(
            "salesforce.api_version must look like `v61.0`".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    salesforce: Option<SalesforcePatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct SalesforcePatch {
    login_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    api_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    discount_overrides_enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
