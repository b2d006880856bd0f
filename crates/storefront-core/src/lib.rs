pub mod app_config;
pub mod basket;
pub mod catalog;
pub mod config;
pub mod resolver;
pub mod slug;

pub use app_config::{AppConfig, CheckoutAppearance, CheckoutColor, CheckoutTheme, Environment};
pub use basket::{AuthLink, Basket, BasketLinks, BasketPackage, InBasket};
pub use catalog::{strip_html, Catalog, Category, CategoryRef, Package, Webstore};
pub use config::{load_app_config, load_app_config_from_env};
pub use resolver::{category_path, resolve, resolve_route, Resolution};
pub use slug::slugify;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("category slug \"{0}\" does not match any category")]
    ResolutionMiss(String),
}
