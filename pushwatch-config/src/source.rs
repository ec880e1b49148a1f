// Rule config sources: inline text, local files and URLs

use crate::{ConfigError, Result, Settings};
use pushwatch_core::DEFAULT_MAX_CONFIG_LEN;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use url::Url;

/// Extra bytes read past the limit so oversize content is still detected
const READ_SLACK: usize = 500;

/// Where rule config text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Inline(String),
    File(PathBuf),
    Url(Url),
}

impl ConfigSource {
    /// Classify a location string
    ///
    /// `http://` and `https://` are URLs, `file://` is a local file, and
    /// anything else is taken as the config text itself.
    pub fn detect(location: &str) -> Result<Self> {
        match Self::parse_url(location)? {
            Some(source) => Ok(source),
            None => Ok(ConfigSource::Inline(location.to_string())),
        }
    }

    /// Like [`detect`](Self::detect), but a bare string names a file path
    pub fn from_location(location: &str) -> Result<Self> {
        match Self::parse_url(location)? {
            Some(source) => Ok(source),
            None => Ok(ConfigSource::File(PathBuf::from(location))),
        }
    }

    fn parse_url(location: &str) -> Result<Option<Self>> {
        let lower = location.trim_start().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(location.trim())
                .map_err(|e| ConfigError::InvalidLocation(format!("{}: {}", location, e)))?;
            return Ok(Some(ConfigSource::Url(url)));
        }
        if lower.starts_with("file://") {
            let path = Url::parse(location.trim())
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| ConfigError::InvalidLocation(location.to_string()))?;
            return Ok(Some(ConfigSource::File(path)));
        }
        Ok(None)
    }

    /// Short description for logs; inline text is not echoed
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Inline(text) => format!("inline ({} bytes)", text.len()),
            ConfigSource::File(path) => format!("file {}", path.display()),
            ConfigSource::Url(url) => format!("url {}", url),
        }
    }
}

/// Reads rule config text with a size bound
#[derive(Debug, Clone)]
pub struct SourceLoader {
    max_len: usize,
    client: reqwest::Client,
}

impl SourceLoader {
    pub fn new(max_len: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("pushwatch/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { max_len, client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.max_config_len, settings.fetch_timeout())
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Most bytes read from a file or URL
    pub fn read_limit(&self) -> usize {
        self.max_len.saturating_add(READ_SLACK)
    }

    /// Fetch the config text; size is enforced later by the parser
    pub async fn load(&self, source: &ConfigSource) -> Result<String> {
        debug!(source = %source.describe(), "loading rule config");
        let text = match source {
            ConfigSource::Inline(text) => return Ok(text.clone()),
            ConfigSource::File(path) => self.load_file(path).await?,
            ConfigSource::Url(url) => self.load_url(url).await?,
        };
        info!(source = %source.describe(), bytes = text.len(), "rule config retrieved");
        Ok(text)
    }

    async fn load_file(&self, path: &Path) -> Result<String> {
        let file = tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.display().to_string()),
            _ => ConfigError::Unreadable(format!("{}: {}", path.display(), e)),
        })?;

        let mut bytes = Vec::new();
        file.take(self.read_limit() as u64)
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| ConfigError::Unreadable(format!("{}: {}", path.display(), e)))?;

        if bytes.is_empty() {
            return Err(ConfigError::Unreadable(format!("{} is empty", path.display())));
        }
        self.decode(bytes)
            .map_err(|e| ConfigError::Unreadable(format!("{}: {}", path.display(), e)))
    }

    async fn load_url(&self, url: &Url) -> Result<String> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        let limit = self.read_limit();
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            bytes.extend_from_slice(&chunk);
            if bytes.len() >= limit {
                bytes.truncate(limit);
                break;
            }
        }

        if bytes.is_empty() {
            return Err(ConfigError::FetchError(format!("{} returned no content", url)));
        }
        self.decode(bytes)
            .map_err(|e| ConfigError::FetchError(format!("{}: {}", url, e)))
    }

    fn decode(&self, bytes: Vec<u8>) -> std::result::Result<String, String> {
        let truncated = bytes.len() >= self.read_limit();
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            // A cut at the read limit may split a character; the text is oversize anyway
            Err(e) if truncated => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            Err(_) => Err("config is not valid UTF-8".to_string()),
        }
    }
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_CONFIG_LEN,
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_detect() {
        assert_eq!(
            ConfigSource::detect("-src/\n!src/gen/").unwrap(),
            ConfigSource::Inline("-src/\n!src/gen/".to_string())
        );
        assert!(matches!(
            ConfigSource::detect("https://example.com/rules.txt").unwrap(),
            ConfigSource::Url(_)
        ));
        assert!(matches!(
            ConfigSource::detect("HTTP://example.com/rules.txt").unwrap(),
            ConfigSource::Url(_)
        ));
        assert_eq!(
            ConfigSource::detect("file:///etc/pushwatch/rules").unwrap(),
            ConfigSource::File(PathBuf::from("/etc/pushwatch/rules"))
        );
    }

    #[test]
    fn test_from_location_bare_path() {
        assert_eq!(
            ConfigSource::from_location("rules.txt").unwrap(),
            ConfigSource::File(PathBuf::from("rules.txt"))
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            ConfigSource::detect("http://"),
            Err(ConfigError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_describe_hides_inline_text() {
        let source = ConfigSource::Inline("@secret=abc".to_string());
        assert_eq!(source.describe(), "inline (11 bytes)");
    }

    #[tokio::test]
    async fn test_load_inline() {
        let loader = SourceLoader::default();
        let text = loader
            .load(&ConfigSource::Inline("-src/".to_string()))
            .await
            .unwrap();
        assert_eq!(text, "-src/");
    }

    #[tokio::test]
    async fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "@email=a@x.io\n-src/\n").unwrap();

        let loader = SourceLoader::default();
        let text = loader
            .load(&ConfigSource::File(file.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(text, "@email=a@x.io\n-src/\n");
    }

    #[tokio::test]
    async fn test_load_file_bounded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("#".repeat(5_000).as_bytes()).unwrap();

        let loader = SourceLoader::new(100, Duration::from_secs(5)).unwrap();
        let text = loader
            .load(&ConfigSource::File(file.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(text.len(), loader.read_limit());
        assert!(text.len() > loader.max_len());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = SourceLoader::default();
        let result = loader
            .load(&ConfigSource::File(dir.path().join("missing.txt")))
            .await;
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let loader = SourceLoader::default();
        let result = loader
            .load(&ConfigSource::File(file.path().to_path_buf()))
            .await;
        assert!(matches!(result, Err(ConfigError::Unreadable(_))));
    }

    #[tokio::test]
    async fn test_load_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rules.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("-src/\n"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/rules.txt", server.uri())).unwrap();
        let loader = SourceLoader::default();
        let text = loader.load(&ConfigSource::Url(url)).await.unwrap();
        assert_eq!(text, "-src/\n");
    }

    #[tokio::test]
    async fn test_load_url_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let result = SourceLoader::default().load(&ConfigSource::Url(url)).await;
        assert!(matches!(result, Err(ConfigError::HttpError(_))));
    }

    #[tokio::test]
    async fn test_load_url_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let result = SourceLoader::default().load(&ConfigSource::Url(url)).await;
        assert!(matches!(result, Err(ConfigError::FetchError(_))));
    }

    #[tokio::test]
    async fn test_load_url_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("#".repeat(50_000)))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let loader = SourceLoader::new(1_000, Duration::from_secs(5)).unwrap();
        let text = loader.load(&ConfigSource::Url(url)).await.unwrap();
        assert_eq!(text.len(), 1_500);
    }
}
