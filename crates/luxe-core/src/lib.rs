pub mod config;
pub mod error;
pub mod types;

pub use config::LuxeConfig;
pub use error::{LuxeError, Result};
pub use types::*;
