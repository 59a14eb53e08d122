pub mod app_config;
pub mod calc;
pub mod categories;
mod config;
pub mod normalize;

pub use app_config::{AppConfig, Environment};
pub use categories::{load_categories, CategoryQuery};
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read category file {path}: {reason}")]
    CategoryFile { path: String, reason: String },
}
