use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "DAILYTALLY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/dailytally.toml";
const ENV_PREFIX: &str = "DAILYTALLY";
const ENV_SEPARATOR: &str = "__";

/// Secrets use the timeline provider's prefix, not the app's
const BEARER_TOKEN_ENV_VAR: &str = "TWITTER_BEARER_TOKEN";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
///
/// An explicit `path` wins over `DAILYTALLY_CONFIG` and the default location.
pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    load_from_sources(path.unwrap_or_else(default_path))
}

/// Config file path: `DAILYTALLY_CONFIG` or the default location
pub fn default_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load secrets from environment variables into config
/// Secrets are never stored in TOML files, only in environment
fn load_secrets(config: &mut Config) {
    if let Ok(token) = env::var(BEARER_TOKEN_ENV_VAR) {
        if !token.is_empty() {
            config.timeline.bearer_token = Some(token);
        }
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    // Start with defaults (handled by struct Default implementations)
    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // DAILYTALLY__POLL__INTERVAL -> poll.interval
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let mut config: Config = builder.build()?.try_deserialize()?;
    load_secrets(&mut config);

    Ok(config)
}
