//! Layered configuration for the `analyze` command.
//!
//! Values are resolved in this order, first match wins: command-line flags,
//! `-S key=value` overrides, the TOML file given with `--config`, built-in defaults.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::AppConfig;
