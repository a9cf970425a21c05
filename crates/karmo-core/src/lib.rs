pub mod app_config;
pub mod category;
mod config;
pub mod product;
pub mod slug;

use thiserror::Error;

pub use app_config::{ApiloConfig, AppConfig, Environment, FeedBackend};
pub use category::{build_category_tree, CategoryNode};
pub use config::{load_app_config, load_app_config_from_env};
pub use product::Product;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
