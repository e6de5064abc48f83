//! Runtime configuration loaded via OrthoConfig.
//!
//! Values come from `--flags`, `STOREFRONT_*` environment variables and
//! config files, in that order of precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Invalid configuration detected after loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("jwt_ttl_secs must be greater than zero")]
    ZeroTokenTtl,
    #[error("db_max_connections must be greater than zero")]
    ZeroPoolSize,
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the process keeps everything in memory.
    pub database_url: Option<String>,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: Option<String>,
    /// Access token lifetime in seconds.
    #[ortho_config(default = 86400)]
    pub jwt_ttl_secs: u64,
    /// Apply embedded migrations before serving. Defaults to on.
    pub run_migrations: Option<bool>,
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref().filter(|secret| !secret.is_empty())
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        match self.jwt_ttl_secs {
            0 => Err(SettingsError::ZeroTokenTtl),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    pub fn pool_size(&self) -> Result<u32, SettingsError> {
        match self.db_max_connections {
            0 => Err(SettingsError::ZeroPoolSize),
            size => Ok(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "STOREFRONT_BIND_ADDR",
        "STOREFRONT_DATABASE_URL",
        "STOREFRONT_JWT_SECRET",
        "STOREFRONT_JWT_TTL_SECS",
        "STOREFRONT_RUN_MIGRATIONS",
        "STOREFRONT_DB_MAX_CONNECTIONS",
    ];

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("storefront")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(env_with(&[]));

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("default addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url().is_none());
        assert!(settings.jwt_secret().is_none());
        assert_eq!(
            settings.token_ttl().expect("ttl"),
            Duration::from_secs(86_400)
        );
        assert!(settings.run_migrations());
        assert_eq!(settings.pool_size().expect("pool size"), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("STOREFRONT_BIND_ADDR", "127.0.0.1:9000"),
            ("STOREFRONT_DATABASE_URL", "postgres://shop@localhost/shop"),
            ("STOREFRONT_JWT_SECRET", "s3cret"),
            ("STOREFRONT_JWT_TTL_SECS", "600"),
            ("STOREFRONT_RUN_MIGRATIONS", "false"),
            ("STOREFRONT_DB_MAX_CONNECTIONS", "4"),
        ]));

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://shop@localhost/shop")
        );
        assert_eq!(settings.jwt_secret(), Some("s3cret"));
        assert_eq!(settings.token_ttl().expect("ttl"), Duration::from_secs(600));
        assert!(!settings.run_migrations());
        assert_eq!(settings.pool_size().expect("pool size"), 4);
    }

    #[rstest]
    #[case::blank_database_url("STOREFRONT_DATABASE_URL", "   ")]
    #[case::empty_secret("STOREFRONT_JWT_SECRET", "")]
    fn blank_optional_values_count_as_missing(#[case] var: &str, #[case] value: &str) {
        let _guard = lock_env(env_with(&[(var, value)]));

        let settings = load();
        assert!(settings.database_url().is_none());
        assert!(settings.jwt_secret().is_none());
    }

    #[rstest]
    #[case::explicitly_on("true", true)]
    #[case::explicitly_off("false", false)]
    fn migrations_follow_the_environment(#[case] value: &str, #[case] expected: bool) {
        let _guard = lock_env(env_with(&[("STOREFRONT_RUN_MIGRATIONS", value)]));

        assert_eq!(load().run_migrations(), expected);
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env(env_with(&[("STOREFRONT_BIND_ADDR", "localhost")]));

        let err = load().bind_addr().expect_err("invalid addr");
        assert!(matches!(err, SettingsError::BindAddr { .. }));
    }

    #[rstest]
    fn zero_token_lifetime_is_rejected() {
        let _guard = lock_env(env_with(&[("STOREFRONT_JWT_TTL_SECS", "0")]));

        assert!(matches!(load().token_ttl(), Err(SettingsError::ZeroTokenTtl)));
    }
}
