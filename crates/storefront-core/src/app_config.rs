use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Color scheme requested from the hosted checkout widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutTheme {
    Light,
    Dark,
    Auto,
}

impl CheckoutTheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CheckoutTheme::Light => "light",
            CheckoutTheme::Dark => "dark",
            CheckoutTheme::Auto => "auto",
        }
    }
}

impl std::fmt::Display for CheckoutTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named palette slot for the checkout widget, e.g. `primary` → `#228B22`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutColor {
    pub name: String,
    pub color: String,
}

impl CheckoutColor {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Everything the checkout widget is initialized with apart from the basket ident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutAppearance {
    pub theme: CheckoutTheme,
    pub colors: Vec<CheckoutColor>,
    pub locale: String,
}

impl Default for CheckoutAppearance {
    fn default() -> Self {
        Self {
            theme: CheckoutTheme::Dark,
            colors: vec![
                CheckoutColor::new("primary", "#228B22"),
                CheckoutColor::new("secondary", "#10B981"),
            ],
            locale: "es_ES".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the commerce platform proxy, e.g. `http://localhost:4000/api/tebex`.
    pub api_base_url: String,
    /// Community/support link shown next to purchase actions.
    pub support_url: String,
    /// Path prefix for category routes, e.g. `/tienda`.
    pub route_prefix: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub checkout: CheckoutAppearance,
    pub notification_ttl_secs: u64,
    pub checkout_poll_interval_secs: u64,
}
