//! Rule sources and service settings for pushwatch
//!
//! - [`ConfigSource`] / [`SourceLoader`]: fetch rule config text inline, from a
//!   file or over HTTP, bounded in size
//! - [`Settings`]: defaults, a `.toml`/`.json` file, `.env` and `PUSHWATCH_*`
//!   environment variables, validated on build
//!
//! ```no_run
//! use pushwatch_config::{Settings, SourceLoader};
//! use pushwatch_core::{Checker, ParseMode};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load(None)?;
//! let loader = SourceLoader::from_settings(&settings)?;
//!
//! let mut checker = Checker::new().with_parser(settings.parser(ParseMode::Strict));
//! if let Some(source) = settings.rules_source()? {
//!     let text = loader.load(&source).await?;
//!     checker.load(&text)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod source;
pub mod validation;

pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{FileFormat, SettingsLoader};
pub use settings::{DEFAULT_FETCH_TIMEOUT_SECS, Settings, SettingsBuilder};
pub use source::{ConfigSource, SourceLoader};
pub use validation::{ConfigValidator, Validate};
