use anyhow::Result;
use chrono::Duration;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::util::duration::parse_duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub jwt: JwtConfig,
    pub captcha: CaptchaConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`. Only
    /// enable behind a proxy that overwrites those headers.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the socket address to bind, as `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Session token settings.
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub signing_key: String,
    /// Token validity, e.g. `7d`.
    pub expires_time: String,
    /// Window before expiry in which clients may refresh, e.g. `1d`.
    pub buffer_time: String,
    pub issuer: String,
    pub audience: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("signing_key", &"<redacted>")
            .field("expires_time", &self.expires_time)
            .field("buffer_time", &self.buffer_time)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtConfig {
    /// ## Errors
    /// Returns `CoreError::InvalidDuration` if `expires_time` does not parse or is not positive.
    pub fn expires_in(&self) -> CoreResult<Duration> {
        let parsed = parse_duration(&self.expires_time)?;
        if parsed <= Duration::zero() {
            return Err(CoreError::ConfigError(
                "jwt.expires_time must be positive".to_owned(),
            ));
        }
        Ok(parsed)
    }

    /// ## Errors
    /// Returns `CoreError::InvalidDuration` if `buffer_time` does not parse.
    pub fn buffer(&self) -> CoreResult<Duration> {
        parse_duration(&self.buffer_time)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    /// Number of digits in a generated captcha.
    pub key_long: usize,
    pub img_width: u32,
    pub img_height: u32,
    /// Failed attempts per client before a captcha is demanded; `0` always demands one.
    pub open_captcha: u32,
    /// Seconds a client's failure counter lives.
    pub open_captcha_timeout: i64,
    /// Seconds a generated captcha stays answerable.
    pub expire_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Check each request path against the caller's menu grants.
    pub use_strict_auth: bool,
    /// Password given to the seeded `admin` user on an empty database.
    pub seed_admin_password: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, environment variables and an optional
    /// `config.toml`. Environment variables use the `GATEHOUSE_` prefix and `__`
    /// between nested keys, e.g. `GATEHOUSE_JWT__SIGNING_KEY`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8888)?
            .set_default("server.trust_forwarded_for", false)?
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "info")?
            .set_default("jwt.signing_key", "")?
            .set_default("jwt.expires_time", "7d")?
            .set_default("jwt.buffer_time", "1d")?
            .set_default("jwt.issuer", "gatehouse")?
            .set_default("jwt.audience", "gatehouse")?
            .set_default("captcha.key_long", 6)?
            .set_default("captcha.img_width", 240)?
            .set_default("captcha.img_height", 80)?
            .set_default("captcha.open_captcha", 0)?
            .set_default("captcha.open_captcha_timeout", 3600)?
            .set_default("captcha.expire_secs", 300)?
            .set_default("system.use_strict_auth", false)?
            .set_default("system.seed_admin_password", "123456")?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Environment overrides the file
            .add_source(
                config::Environment::with_prefix("GATEHOUSE")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    Settings::load()
}
