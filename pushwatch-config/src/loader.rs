// Settings file loading

use crate::{ConfigError, Result, Settings};
use std::fs;
use std::path::Path;

/// Supported settings file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Settings file loader
pub struct SettingsLoader {
    format: FileFormat,
}

impl SettingsLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConfigError::ParseError(format!("No file extension on {}", path.display()))
            })?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::ParseError(format!("Unsupported format: {}", ext)))?;

        Ok(Self::new(format))
    }

    /// Load settings from a file
    pub fn load_file(&self, path: &Path) -> Result<Settings> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.display().to_string()),
            _ => ConfigError::IoError(e),
        })?;

        self.parse(&content)
    }

    /// Parse settings from a string; absent keys keep their defaults
    pub fn parse(&self, content: &str) -> Result<Settings> {
        match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::DeserializationError(format!("JSON: {}", e))),
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::DeserializationError(format!("TOML: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushwatch_core::DEFAULT_MAX_CONFIG_LEN;
    use std::io::Write;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert!(SettingsLoader::auto(Path::new("settings")).is_err());
    }

    #[test]
    fn test_parse_toml() {
        let loader = SettingsLoader::new(FileFormat::Toml);
        let settings = loader
            .parse("rules = \"https://example.com/rules.txt\"\nfetch_timeout_secs = 3\n")
            .unwrap();

        assert_eq!(
            settings.rules.as_deref(),
            Some("https://example.com/rules.txt")
        );
        assert_eq!(settings.fetch_timeout_secs, 3);
        assert_eq!(settings.max_config_len, DEFAULT_MAX_CONFIG_LEN);
    }

    #[test]
    fn test_parse_json() {
        let loader = SettingsLoader::new(FileFormat::Json);
        let settings = loader
            .parse(r#"{"max_config_len": 500, "alert_email": "ops@example.com"}"#)
            .unwrap();

        assert_eq!(settings.max_config_len, 500);
        assert_eq!(settings.alert_email.as_deref(), Some("ops@example.com"));
        assert!(settings.rules.is_none());
    }

    #[test]
    fn test_parse_type_mismatch() {
        let loader = SettingsLoader::new(FileFormat::Toml);
        let result = loader.parse("max_config_len = \"big\"");
        assert!(matches!(result, Err(ConfigError::DeserializationError(_))));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "rules = \"rules.txt\"").unwrap();

        let loader = SettingsLoader::auto(file.path()).unwrap();
        let settings = loader.load_file(file.path()).unwrap();
        assert_eq!(settings.rules.as_deref(), Some("rules.txt"));
    }
}
