pub mod config;
pub mod error;
pub mod i18n;
pub mod types;

pub use config::{UserConfig, load_config};
pub use error::{Error, Result};
pub use types::*;
