//! Configuration management.
//!
//! Loads configuration from environment variables using dotenvy.
//! Settings are loaded at startup and stored in a thread-safe Arc.

mod error;
mod options;
mod settings;

pub use error::{CookieError, PayloadError, Result};
pub use options::{
    ConfigProvider, CookieConfig, CookieOptions, DEFAULT_COOKIE_CONFIG, Encryption,
};
pub use settings::Config;
