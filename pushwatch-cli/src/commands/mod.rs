//! CLI command implementations.

pub mod check;
pub mod sign;
pub mod validate;

use crate::error::CliResult;
use pushwatch_config::{Settings, SourceLoader};
use pushwatch_core::CheckError;
use std::io::Read;
use std::path::Path;

/// Settings from file and environment, with `--rules` taking precedence
pub(crate) fn load_settings(path: Option<&Path>, rules: Option<&str>) -> CliResult<Settings> {
    let mut settings = Settings::load(path)?;
    if let Some(rules) = rules {
        settings.rules = Some(rules.to_string());
    }
    Ok(settings)
}

/// Fetch rule config text for `settings`
///
/// Missing or unreadable config is a check error, not a usage error.
pub(crate) async fn fetch_rules(settings: &Settings) -> Result<String, CheckError> {
    let source = settings
        .rules_source()?
        .ok_or(CheckError::ConfigNotLoaded)?;
    pushwatch_log::debug!(target: "pushwatch::cli", "rules from {}", source.describe());

    let loader = SourceLoader::from_settings(settings)?;
    let text = loader.load(&source).await?;
    Ok(text)
}

/// Read a body from `path`, or stdin when absent or `-`
pub(crate) fn read_body(path: Option<&Path>) -> CliResult<Vec<u8>> {
    let mut body = Vec::new();
    match path {
        Some(path) if path != Path::new("-") => {
            body = std::fs::read(path)?;
        }
        _ => {
            std::io::stdin().read_to_end(&mut body)?;
        }
    }
    Ok(body)
}
