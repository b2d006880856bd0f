use crate::app_config::{AppConfig, CheckoutAppearance, CheckoutColor, CheckoutTheme, Environment};
use crate::ConfigError;

const DEFAULT_API_URL: &str = "http://localhost:4000/api";
const DEFAULT_SUPPORT_URL: &str = "https://discord.com/invite/FQh9dcNMQq";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("STOREFRONT_ENV", "development"));
    let log_level = or_default("STOREFRONT_LOG_LEVEL", "info");

    let api_base_url = or_default("STOREFRONT_API_URL", DEFAULT_API_URL);
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_API_URL".to_string(),
            reason: format!("\"{api_base_url}\" must start with http:// or https://"),
        });
    }

    let support_url = or_default("STOREFRONT_SUPPORT_URL", DEFAULT_SUPPORT_URL);
    let route_prefix = normalize_route_prefix(&or_default("STOREFRONT_ROUTE_PREFIX", "/tienda"));

    let request_timeout_secs = parse_u64("STOREFRONT_REQUEST_TIMEOUT_SECS", "15")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "timeout must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("STOREFRONT_USER_AGENT", "storefront/0.1 (checkout)");

    let theme = parse_theme(&or_default("STOREFRONT_CHECKOUT_THEME", "dark"))?;
    let locale = or_default("STOREFRONT_CHECKOUT_LOCALE", "es_ES");
    let primary = or_default("STOREFRONT_CHECKOUT_PRIMARY_COLOR", "#228B22");
    let secondary = or_default("STOREFRONT_CHECKOUT_SECONDARY_COLOR", "#10B981");

    let notification_ttl_secs = parse_u64("STOREFRONT_NOTIFICATION_TTL_SECS", "5")?;
    let checkout_poll_interval_secs = parse_u64("STOREFRONT_CHECKOUT_POLL_INTERVAL_SECS", "3")?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        support_url,
        route_prefix,
        request_timeout_secs,
        user_agent,
        checkout: CheckoutAppearance {
            theme,
            colors: vec![
                CheckoutColor::new("primary", primary),
                CheckoutColor::new("secondary", secondary),
            ],
            locale,
        },
        notification_ttl_secs,
        checkout_poll_interval_secs,
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

fn parse_theme(s: &str) -> Result<CheckoutTheme, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "light" => Ok(CheckoutTheme::Light),
        "dark" => Ok(CheckoutTheme::Dark),
        "auto" => Ok(CheckoutTheme::Auto),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_CHECKOUT_THEME".to_string(),
            reason: format!("unknown theme \"{other}\"; expected light, dark, or auto"),
        }),
    }
}

/// Ensures a single leading slash and no trailing slash (`tienda/` → `/tienda`).
fn normalize_route_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
