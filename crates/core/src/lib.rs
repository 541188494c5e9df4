pub mod config;
pub mod error;
pub mod types;

pub use config::{load_site_config, parse_site_toml, validate_relative_path};
pub use error::{Error, Result};
pub use types::*;
