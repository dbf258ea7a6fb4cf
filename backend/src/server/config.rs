//! Environment-driven application configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 4000;
/// Default flat-file location, relative to the working directory.
pub const DEFAULT_USERS_FILE: &str = "users.json";
/// Default DynamoDB table name.
pub const DEFAULT_TABLE: &str = "users";
/// Default static asset directory.
pub const DEFAULT_STATIC_ROOT: &str = "public";

/// Lookup seam over the process environment, so parsing stays testable
/// without mutating global state.
pub trait Env {
    /// Return the variable's value, or `None` when unset or not unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// [`Env`] reading the real process environment.
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Configuration errors that abort startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `PORT` was set but is not a TCP port number.
    #[error("PORT must be a TCP port number, got `{value}`")]
    InvalidPort { value: String },
    /// `USER_STORE` named an unknown backend.
    #[error("USER_STORE must be `file` or `dynamodb`, got `{value}`")]
    UnknownStore { value: String },
}

/// Which storage adapter serves the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Flat JSON file, fully rewritten on every mutation.
    JsonFile {
        /// Location of the collection file.
        path: PathBuf,
    },
    /// DynamoDB table keyed on the user `id`.
    DynamoDb {
        /// Table name.
        table: String,
        /// Endpoint URL override (e.g. a local DynamoDB); standard AWS
        /// resolution applies when unset.
        endpoint: Option<String>,
    },
}

/// Cross-origin policy for the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Mirror any origin, the original deployment's blanket policy.
    Any,
    /// Only the listed origins.
    List(Vec<String>),
}

/// Fully parsed runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the listener binds.
    pub bind_addr: SocketAddr,
    /// Selected storage backend.
    pub store: StoreConfig,
    /// Cross-origin policy.
    pub allowed_origins: AllowedOrigins,
    /// Directory holding the web client.
    pub static_root: PathBuf,
}

impl AppConfig {
    /// Parse configuration from the process environment.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when a variable is set to an unusable
    /// value; unset variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&ProcessEnv)
    }

    /// Parse configuration from an arbitrary [`Env`] source.
    ///
    /// # Errors
    /// Same contract as [`AppConfig::from_env`].
    pub fn load(env: &impl Env) -> Result<Self, ConfigError> {
        let port = parse_port(env)?;
        Ok(Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            store: parse_store(env)?,
            allowed_origins: parse_origins(env),
            static_root: env
                .var("STATIC_ROOT")
                .map_or_else(|| PathBuf::from(DEFAULT_STATIC_ROOT), PathBuf::from),
        })
    }
}

fn parse_port(env: &impl Env) -> Result<u16, ConfigError> {
    let Some(value) = env.var("PORT") else {
        return Ok(DEFAULT_PORT);
    };
    value
        .parse()
        .map_err(|_| ConfigError::InvalidPort { value })
}

fn parse_store(env: &impl Env) -> Result<StoreConfig, ConfigError> {
    let selected = env.var("USER_STORE").unwrap_or_else(|| "file".to_owned());
    match selected.as_str() {
        "file" => Ok(StoreConfig::JsonFile {
            path: env
                .var("USERS_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_USERS_FILE), PathBuf::from),
        }),
        "dynamodb" => Ok(StoreConfig::DynamoDb {
            table: env
                .var("DYNAMODB_TABLE")
                .unwrap_or_else(|| DEFAULT_TABLE.to_owned()),
            endpoint: env.var("DYNAMODB_ENDPOINT"),
        }),
        _ => Err(ConfigError::UnknownStore { value: selected }),
    }
}

fn parse_origins(env: &impl Env) -> AllowedOrigins {
    let Some(raw) = env.var("ALLOWED_ORIGINS") else {
        return AllowedOrigins::Any;
    };
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if origins.is_empty() {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    struct FakeEnv(Vec<(&'static str, &'static str)>);

    impl Env for FakeEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.0
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn an_empty_environment_yields_the_defaults() {
        let config = AppConfig::load(&FakeEnv(Vec::new())).expect("defaults");

        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(
            config.store,
            StoreConfig::JsonFile {
                path: PathBuf::from(DEFAULT_USERS_FILE)
            }
        );
        assert_eq!(config.allowed_origins, AllowedOrigins::Any);
        assert_eq!(config.static_root, PathBuf::from(DEFAULT_STATIC_ROOT));
    }

    #[test]
    fn the_port_is_read_from_the_environment() {
        let config = AppConfig::load(&FakeEnv(vec![("PORT", "8080")])).expect("valid port");
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[rstest]
    #[case("nope")]
    #[case("-1")]
    #[case("70000")]
    fn an_unusable_port_aborts_startup(#[case] value: &'static str) {
        let err = AppConfig::load(&FakeEnv(vec![("PORT", value)])).expect_err("invalid port");
        assert_eq!(
            err,
            ConfigError::InvalidPort {
                value: value.to_owned()
            }
        );
    }

    #[test]
    fn the_dynamodb_store_reads_table_and_endpoint() {
        let env = FakeEnv(vec![
            ("USER_STORE", "dynamodb"),
            ("DYNAMODB_TABLE", "roster"),
            ("DYNAMODB_ENDPOINT", "http://localhost:8000"),
        ]);
        let config = AppConfig::load(&env).expect("valid store");
        assert_eq!(
            config.store,
            StoreConfig::DynamoDb {
                table: "roster".to_owned(),
                endpoint: Some("http://localhost:8000".to_owned()),
            }
        );
    }

    #[test]
    fn an_unknown_store_aborts_startup() {
        let err =
            AppConfig::load(&FakeEnv(vec![("USER_STORE", "redis")])).expect_err("unknown store");
        assert_eq!(
            err,
            ConfigError::UnknownStore {
                value: "redis".to_owned()
            }
        );
    }

    #[rstest]
    #[case("http://a.test", vec!["http://a.test"])]
    #[case("http://a.test, http://b.test", vec!["http://a.test", "http://b.test"])]
    #[case("http://a.test,,", vec!["http://a.test"])]
    fn origin_lists_are_split_and_trimmed(
        #[case] raw: &'static str,
        #[case] expected: Vec<&str>,
    ) {
        let config =
            AppConfig::load(&FakeEnv(vec![("ALLOWED_ORIGINS", raw)])).expect("valid origins");
        assert_eq!(
            config.allowed_origins,
            AllowedOrigins::List(expected.into_iter().map(ToOwned::to_owned).collect())
        );
    }

    #[test]
    fn a_blank_origin_list_falls_back_to_any() {
        let config =
            AppConfig::load(&FakeEnv(vec![("ALLOWED_ORIGINS", "  ")])).expect("valid origins");
        assert_eq!(config.allowed_origins, AllowedOrigins::Any);
    }
}
