//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use http::header::{HeaderValue, InvalidHeaderValue};
use serde::Deserialize;
use smart_default::SmartDefault;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

impl Cors {
    /// Builds a [`CorsLayer`] allowing the GraphQL requests from the
    /// configured origins.
    ///
    /// # Errors
    ///
    /// Errors if any of the configured origins is not a valid header value.
    pub fn layer(&self) -> Result<CorsLayer, InvalidHeaderValue> {
        let origin = if self.origins.iter().any(|o| o == "*") {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(
                self.origins
                    .iter()
                    .map(|o| o.parse::<HeaderValue>())
                    .collect::<Result<Vec<_>, _>>()?,
            )
        };
        Ok(CorsLayer::new()
            .allow_methods([
                http::Method::GET,
                http::Method::OPTIONS,
                http::Method::POST,
            ])
            .allow_headers([
                http::header::AUTHORIZATION,
                http::header::CONTENT_TYPE,
            ])
            .allow_origin(origin))
    }
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Lifetime of an issued access token.
    #[default(time::Duration::from_secs(15 * 60))]
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: time::Duration,

    /// Lifetime of an issued refresh token.
    #[default(time::Duration::from_secs(60 * 60 * 24 * 30))]
    #[serde(with = "humantime_serde")]
    pub refresh_token_ttl: time::Duration,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
            tasks: Tasks {
                clean_expired_sessions,
            },
        } = value;
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            access_token_ttl,
            refresh_token_ttl,
            clean_expired_sessions:
                service::task::clean_expired_sessions::Config {
                    interval: clean_expired_sessions.interval,
                },
        }
    }
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `CleanExpiredSessions` task configuration.
    pub clean_expired_sessions: Task,
}

/// Service task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Task {
    /// Task execution interval.
    #[default(time::Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use config::{ConfigBuilder, File, FileFormat};

    use super::{Config, Cors, LogLevel};

    fn parse(toml: &str) -> Config {
        ConfigBuilder::<config::builder::DefaultState>::default()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn fills_missing_sections_with_defaults() {
        let conf = parse("");

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.cors.origins, ["*"]);
        assert_eq!(conf.service.access_token_ttl, Duration::from_secs(900));
        assert_eq!(
            conf.service.tasks.clean_expired_sessions.interval,
            Duration::from_secs(3600),
        );
        assert_eq!(conf.postgres.dbname, "postgres");
        assert!(matches!(conf.log.level, LogLevel::Info));
    }

    #[test]
    fn reads_humantime_durations() {
        let conf = parse(
            r#"
            [service]
            access_token_ttl = "5m"
            refresh_token_ttl = "7days"

            [service.tasks.clean_expired_sessions]
            interval = "10m"

            [log]
            level = "DEBUG"
            "#,
        );

        assert_eq!(conf.service.access_token_ttl, Duration::from_secs(300));
        assert_eq!(
            conf.service.refresh_token_ttl,
            Duration::from_secs(7 * 24 * 3600),
        );
        assert_eq!(
            conf.service.tasks.clean_expired_sessions.interval,
            Duration::from_secs(600),
        );
        assert!(matches!(conf.log.level, LogLevel::Debug));
    }

    #[test]
    fn builds_cors_layer() {
        let any = Cors::default();
        let listed = Cors {
            origins: vec!["https://bus.example".into()],
        };

        assert!(any.layer().is_ok());
        assert!(listed.layer().is_ok());
    }

    #[test]
    fn rejects_invalid_cors_origin() {
        let cors = Cors {
            origins: vec!["https://bus.example".into(), "bad\norigin".into()],
        };

        assert!(cors.layer().is_err());
    }
}
