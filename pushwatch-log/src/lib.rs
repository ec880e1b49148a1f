//! pushwatch logging
//!
//! Structured logging to stderr, controlled by environment variables and
//! adjustable at runtime.
//!
//! # Usage
//!
//! ```rust
//! use pushwatch_log::{debug, info, warn, error, trace, Field, Level};
//!
//! debug!("Loading rules");
//! info!("Checked {} files", 12);
//! warn!(target: "pushwatch::source", "Config fetch was slow");
//!
//! // Structured event with key/value fields
//! pushwatch_log::event(
//!     Level::Info,
//!     "pushwatch::check",
//!     "check completed",
//!     &[Field::new("repository", "acme/app"), Field::new("notify", 3)],
//! );
//! ```
//!
//! # Environment Variables
//!
//! - `PUSHWATCH_DEBUG=1` - Enable debug logging
//! - `PUSHWATCH_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `PUSHWATCH_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `PUSHWATCH_LOG_COLOR=1|0` - Enable/disable colors
//! - `PUSHWATCH_LOG_TIMESTAMPS=1|0` - Include timestamps

use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Per-file matching detail
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// No logging
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    #[cfg(feature = "color")]
    fn colored(&self) -> colored::ColoredString {
        use colored::Colorize;
        match self {
            Level::Trace => "TRACE".magenta(),
            Level::Debug => "DEBUG".blue(),
            Level::Info => "INFO".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERROR".red().bold(),
            Level::Off => "OFF".white(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Format {
    /// Human readable, one record per line (default)
    Pretty = 0,
    /// Terse single-line format
    Compact = 1,
    /// One JSON object per line
    Json = 2,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Format::Compact,
            2 => Format::Json,
            _ => Format::Pretty,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);
static LOG_FORMAT: AtomicU8 = AtomicU8::new(Format::Pretty as u8);
static COLOR_ENABLED: AtomicBool = AtomicBool::new(false);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
    LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);
    LOG_FORMAT.store(config.format as u8, Ordering::SeqCst);
    COLOR_ENABLED.store(config.color, Ordering::SeqCst);
    config
});

/// Logging configuration read from the environment at startup.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Pretty,
            color: false,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Read `PUSHWATCH_*` logging variables.
    pub fn from_env() -> Self {
        let debug = env_flag("PUSHWATCH_DEBUG").unwrap_or(false);

        let level = env::var("PUSHWATCH_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = env::var("PUSHWATCH_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Pretty);

        // Color only when not disabled and a terminal type is known
        let color = env_flag("PUSHWATCH_LOG_COLOR")
            .unwrap_or_else(|| env::var("NO_COLOR").is_err() && env::var("TERM").is_ok());

        let timestamps = env_flag("PUSHWATCH_LOG_TIMESTAMPS").unwrap_or(true);

        Self {
            debug,
            level,
            format,
            color,
            timestamps,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

// ============================================================================
// Public API
// ============================================================================

/// Read the environment configuration now instead of on first use.
pub fn init() {
    Lazy::force(&CONFIG);
}

#[inline]
pub fn is_debug_enabled() -> bool {
    init();
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    init();
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn current_level() -> Level {
    init();
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set the log level at runtime, overriding the environment.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Enable or disable debug mode at runtime.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

pub fn current_format() -> Format {
    init();
    Format::from_u8(LOG_FORMAT.load(Ordering::Relaxed))
}

pub fn set_format(format: Format) {
    init();
    LOG_FORMAT.store(format as u8, Ordering::SeqCst);
}

pub fn set_color(enabled: bool) {
    init();
    COLOR_ENABLED.store(enabled, Ordering::SeqCst);
}

/// The configuration read from the environment.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Structured Fields
// ============================================================================

/// A key/value pair attached to a log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub value: String,
}

impl Field {
    pub fn new(name: &'static str, value: impl fmt::Display) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// Log Output
// ============================================================================

/// Emit a plain message.
#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    event(level, target, message, &[]);
}

/// Emit a message with structured fields.
pub fn event(level: Level, target: &str, message: &str, fields: &[Field]) {
    if !is_level_enabled(level) {
        return;
    }

    let line = render(current_format(), level, target, message, fields);
    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

fn render(format: Format, level: Level, target: &str, message: &str, fields: &[Field]) -> String {
    match format {
        Format::Pretty => render_pretty(level, target, message, fields),
        Format::Compact => render_compact(level, target, message, fields),
        Format::Json => render_json(level, target, message, fields),
    }
}

fn render_pretty(level: Level, target: &str, message: &str, fields: &[Field]) -> String {
    let mut out = String::new();

    if config().timestamps {
        out.push_str(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
    }

    #[cfg(feature = "color")]
    if COLOR_ENABLED.load(Ordering::Relaxed) {
        out.push_str(&format!("{:5} ", level.colored()));
    } else {
        out.push_str(&format!("{:5} ", level.as_str()));
    }

    #[cfg(not(feature = "color"))]
    out.push_str(&format!("{:5} ", level.as_str()));

    if !target.is_empty() {
        out.push_str(&format!("[{}] ", target));
    }
    out.push_str(message);
    push_fields(&mut out, fields);
    out
}

fn render_compact(level: Level, target: &str, message: &str, fields: &[Field]) -> String {
    let mut out = String::new();

    if config().timestamps {
        out.push_str(&chrono::Local::now().format("%H:%M:%S ").to_string());
    }
    out.push(level.as_str().chars().next().unwrap_or('?'));
    out.push(' ');
    if !target.is_empty() {
        out.push_str(target);
        out.push_str(": ");
    }
    out.push_str(message);
    push_fields(&mut out, fields);
    out
}

fn push_fields(out: &mut String, fields: &[Field]) {
    for field in fields {
        if field.value.contains(char::is_whitespace) || field.value.is_empty() {
            out.push_str(&format!(" {}={:?}", field.name, field.value));
        } else {
            out.push_str(&format!(" {}={}", field.name, field.value));
        }
    }
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str, fields: &[Field]) -> String {
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct LogEntry<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        fields: BTreeMap<&'a str, &'a str>,
    }

    let entry = LogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
        fields: fields
            .iter()
            .map(|f| (f.name, f.value.as_str()))
            .collect(),
    };

    serde_json::to_string(&entry).unwrap_or_default()
}

#[cfg(not(feature = "json"))]
fn render_json(level: Level, target: &str, message: &str, fields: &[Field]) -> String {
    let mut out = format!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}""#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    );
    if !fields.is_empty() {
        let pairs: Vec<String> = fields
            .iter()
            .map(|f| format!(r#""{}":"{}""#, escape_json(f.name), escape_json(&f.value)))
            .collect();
        out.push_str(&format!(r#","fields":{{{}}}"#, pairs.join(",")));
    }
    out.push('}');
    out
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

// ============================================================================
// Macros
// ============================================================================

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a debug message.
///
/// Enabled by `PUSHWATCH_DEBUG=1`, `PUSHWATCH_LOG_LEVEL=debug` or [`set_debug`].
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, module_path!(), &format!($($arg)+));
        }
    };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! Bridge for crates that log through `tracing`.

    use super::*;

    /// A subscriber honouring the current pushwatch level.
    ///
    /// `RUST_LOG` takes precedence when set.
    pub fn subscriber() -> impl tracing::Subscriber + Send + Sync {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let level = match current_level() {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(COLOR_ENABLED.load(Ordering::Relaxed)),
        )
    }

    /// Install [`subscriber`] globally; later calls are ignored.
    pub fn install() {
        let _ = tracing::subscriber::set_global_default(subscriber());
    }
}

// ============================================================================
// Tests
// ============================================================================
