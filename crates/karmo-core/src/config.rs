use crate::app_config::{ApiloConfig, AppConfig, Environment, FeedBackend};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function. Decoupled from the real environment so tests can drive it with
/// a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("KARMO_ENV", "development"));
    let bind_addr = parse_addr("KARMO_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("KARMO_LOG_LEVEL", "info");

    let feed_backend = parse_feed_backend(&or_default("KARMO_FEED_BACKEND", "xml"))?;

    let feed_url = lookup("KARMO_FEED_URL").ok();
    let stock_feed_url = lookup("KARMO_STOCK_FEED_URL").ok();
    let feed_timeout_secs = parse_u64("KARMO_FEED_TIMEOUT_SECS", "30")?;
    let feed_user_agent = or_default("KARMO_FEED_USER_AGENT", "karmo/0.1 (catalog-sync)");
    let feed_max_retries = parse_u32("KARMO_FEED_MAX_RETRIES", "3")?;
    let feed_backoff_base_secs = parse_u64("KARMO_FEED_BACKOFF_BASE_SECS", "5")?;

    let apilo = match feed_backend {
        FeedBackend::Apilo => Some(ApiloConfig {
            base_url: require("KARMO_APILO_BASE_URL")?,
            client_id: require("KARMO_APILO_CLIENT_ID")?,
            client_secret: require("KARMO_APILO_CLIENT_SECRET")?,
            page_size: parse_u32("KARMO_APILO_PAGE_SIZE", "100")?,
        }),
        FeedBackend::Xml => None,
    };

    if feed_backend == FeedBackend::Xml && feed_url.is_none() {
        return Err(ConfigError::MissingEnvVar("KARMO_FEED_URL".to_string()));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        feed_backend,
        feed_url,
        stock_feed_url,
        feed_timeout_secs,
        feed_user_agent,
        feed_max_retries,
        feed_backoff_base_secs,
        apilo,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_feed_backend(s: &str) -> Result<FeedBackend, ConfigError> {
    match s {
        "xml" => Ok(FeedBackend::Xml),
        "apilo" => Ok(FeedBackend::Apilo),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KARMO_FEED_BACKEND".to_string(),
            reason: format!("unknown backend \"{other}\" (expected \"xml\" or \"apilo\")"),
        }),
    }
}
