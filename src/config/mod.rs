//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{collections::HashMap, fmt, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::types::{ContentKind, Locale};
use crate::infra::retry::RetryPolicy;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "atrium";
const ENV_PREFIX: &str = "ATRIUM";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_CONTENT_BASE_URL: &str = "http://127.0.0.1:1337";
const DEFAULT_CONTENT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_LOCALES: &str = "tr,en";
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
const DEFAULT_RETRY_KINDS: &str = "footer";
const DEFAULT_REVALIDATE_INTERVAL_SECS: u64 = 3_600;
const DEFAULT_RESPONSE_LIMIT: usize = 256;

/// Command-line arguments for the atrium binary.
#[derive(Debug, Parser)]
#[command(name = "atrium", version, about = "Locale-scoped site content service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "ATRIUM_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Resolve one configuration and print it as JSON.
    Resolve(ResolveArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Clone)]
pub struct ResolveArgs {
    /// Content kind (navbar, hero, welcome, treatments, contact-map, footer).
    #[arg(value_name = "KIND")]
    pub kind: ContentKind,

    /// Locale to resolve.
    #[arg(long, value_name = "CODE")]
    pub locale: String,

    #[command(flatten)]
    pub content: ContentOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Override the content backend base URL.
    #[arg(long = "content-base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the content fetch timeout.
    #[arg(long = "content-timeout-ms", value_name = "MILLIS")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the comma-separated list of supported locales.
    #[arg(long = "content-locales", value_name = "CODES")]
    pub locales: Option<String>,

    /// Toggle warming every kind and locale before serving.
    #[arg(
        long = "content-prefetch-on-startup",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub prefetch_on_startup: Option<bool>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub revalidation: RevalidationSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub base_url: Url,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub locales: Vec<Locale>,
    pub retry: RetryPolicy,
    /// Kinds whose fetches go through the retrying fetcher.
    pub retry_kinds: Vec<ContentKind>,
    pub prefetch_on_startup: bool,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Maximum number of public responses kept; least recently used go first.
    pub response_limit: usize,
}

#[derive(Clone)]
pub struct RevalidationSettings {
    /// Shared webhook secret; `None` rejects every webhook call.
    pub secret: Option<String>,
    pub interval: Duration,
    pub intervals: HashMap<ContentKind, Duration>,
}

impl fmt::Debug for RevalidationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevalidationSettings")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("interval", &self.interval)
            .field("intervals", &self.intervals)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Resolve(args)) => raw.apply_content_overrides(&args.content),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    revalidation: RawRevalidationSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(locales) = overrides.locales.as_ref() {
            self.content.locales = Some(locales.clone());
        }
        if let Some(prefetch) = overrides.prefetch_on_startup {
            self.content.prefetch_on_startup = Some(prefetch);
        }

        self.apply_content_overrides(&overrides.content);
    }

    fn apply_content_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(url) = overrides.base_url.as_ref() {
            self.content.base_url = Some(url.clone());
        }
        if let Some(timeout) = overrides.timeout_ms {
            self.content.timeout_ms = Some(timeout);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            revalidation,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            revalidation: build_revalidation_settings(revalidation)?,
            cache: build_cache_settings(cache)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr =
        parse_socket_addr(&host, port).map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let base_url_raw = content
        .base_url
        .unwrap_or_else(|| DEFAULT_CONTENT_BASE_URL.to_string());
    let base_url = Url::parse(base_url_raw.trim())
        .map_err(|err| LoadError::invalid("content.base_url", format!("failed to parse: {err}")))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "content.base_url",
            "scheme must be http or https",
        ));
    }

    let timeout_ms = content.timeout_ms.unwrap_or(DEFAULT_CONTENT_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(LoadError::invalid(
            "content.timeout_ms",
            "must be greater than zero",
        ));
    }

    let ttl_secs = content.cache_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    if ttl_secs == 0 {
        return Err(LoadError::invalid(
            "content.cache_ttl_seconds",
            "must be greater than zero",
        ));
    }

    let locales_raw = content
        .locales
        .unwrap_or_else(|| DEFAULT_LOCALES.to_string());
    let locales = Locale::parse_list(&locales_raw)
        .map_err(|err| LoadError::invalid("content.locales", err.to_string()))?;
    if locales.is_empty() {
        return Err(LoadError::invalid(
            "content.locales",
            "at least one locale is required",
        ));
    }

    let max_attempts = content
        .retry_max_attempts
        .unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS);
    if max_attempts == 0 {
        return Err(LoadError::invalid(
            "content.retry_max_attempts",
            "must be greater than zero",
        ));
    }
    let base_delay = Duration::from_millis(
        content
            .retry_base_delay_ms
            .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
    );

    let retry_kinds_raw = content
        .retry_kinds
        .unwrap_or_else(|| DEFAULT_RETRY_KINDS.to_string());
    let retry_kinds = parse_kind_list(&retry_kinds_raw)
        .map_err(|reason| LoadError::invalid("content.retry_kinds", reason))?;

    Ok(ContentSettings {
        base_url,
        timeout: Duration::from_millis(timeout_ms),
        cache_ttl: Duration::from_secs(ttl_secs),
        locales,
        retry: RetryPolicy::new(max_attempts, base_delay),
        retry_kinds,
        prefetch_on_startup: content.prefetch_on_startup.unwrap_or(true),
    })
}

fn build_revalidation_settings(
    revalidation: RawRevalidationSettings,
) -> Result<RevalidationSettings, LoadError> {
    let secret = revalidation.secret.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let interval_secs = revalidation
        .interval_seconds
        .unwrap_or(DEFAULT_REVALIDATE_INTERVAL_SECS);
    if interval_secs == 0 {
        return Err(LoadError::invalid(
            "revalidation.interval_seconds",
            "must be greater than zero",
        ));
    }

    let mut intervals = HashMap::new();
    for (name, seconds) in revalidation.intervals {
        let kind = ContentKind::from_str(&name)
            .map_err(|err| LoadError::invalid("revalidation.intervals", err.to_string()))?;
        if seconds == 0 {
            return Err(LoadError::invalid(
                "revalidation.intervals",
                format!("interval for `{kind}` must be greater than zero"),
            ));
        }
        intervals.insert(kind, Duration::from_secs(seconds));
    }

    Ok(RevalidationSettings {
        secret,
        interval: Duration::from_secs(interval_secs),
        intervals,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let response_limit = cache.response_limit.unwrap_or(DEFAULT_RESPONSE_LIMIT);
    if response_limit == 0 {
        return Err(LoadError::invalid(
            "cache.response_limit",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings { response_limit })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    cache_ttl_seconds: Option<u64>,
    locales: Option<String>,
    retry_max_attempts: Option<u32>,
    retry_base_delay_ms: Option<u64>,
    retry_kinds: Option<String>,
    prefetch_on_startup: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRevalidationSettings {
    secret: Option<String>,
    interval_seconds: Option<u64>,
    intervals: HashMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    response_limit: Option<usize>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_kind_list(value: &str) -> Result<Vec<ContentKind>, String> {
    let mut kinds = Vec::new();
    for part in value.split(',').filter(|part| !part.trim().is_empty()) {
        let kind = ContentKind::from_str(part).map_err(|err| err.to_string())?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
