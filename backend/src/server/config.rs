//! HTTP server configuration resolved from [`AppSettings`].

use std::net::SocketAddr;
use std::time::Duration;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use storefront::outbound::memory::InMemoryStore;
use storefront::outbound::persistence::{
    DbPool, MigrationError, PoolConfig, PoolError, run_pending_migrations,
};
use storefront::settings::{AppSettings, SettingsError};
use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroizing;

const EPHEMERAL_SECRET_LEN: usize = 32;

/// Start-up failures raised before the listener binds.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("STOREFRONT_JWT_SECRET is required when a database is configured")]
    MissingJwtSecret,
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Where aggregates are kept.
#[derive(Clone)]
pub enum Storage {
    Postgres(DbPool),
    Memory(InMemoryStore),
}

/// Everything the server needs to build its application state.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Storage,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: Duration,
}

impl ServerConfig {
    /// Resolve storage and credentials from loaded settings.
    ///
    /// With a database URL this applies migrations (unless disabled) and
    /// insists on a configured signing secret. Without one the in-memory
    /// store is used and a missing secret is replaced by a random one.
    pub async fn from_settings(settings: &AppSettings) -> Result<Self, StartupError> {
        let bind_addr = settings.bind_addr()?;
        let token_ttl = settings.token_ttl()?;

        let (storage, jwt_secret) = match settings.database_url() {
            Some(url) => {
                let secret = settings
                    .jwt_secret()
                    .ok_or(StartupError::MissingJwtSecret)?;
                if settings.run_migrations() {
                    let applied = run_pending_migrations(url).await?;
                    info!(applied, "database migrations applied");
                }
                let pool =
                    DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_size()?)).await?;
                (
                    Storage::Postgres(pool),
                    Zeroizing::new(secret.as_bytes().to_vec()),
                )
            }
            None => {
                warn!("no database configured; data is kept in memory and lost on restart");
                let secret = match settings.jwt_secret() {
                    Some(secret) => Zeroizing::new(secret.as_bytes().to_vec()),
                    None => {
                        warn!("no JWT secret configured; tokens will not survive a restart");
                        ephemeral_secret()
                    }
                };
                (Storage::Memory(InMemoryStore::new()), secret)
            }
        };

        Ok(Self {
            bind_addr,
            storage,
            jwt_secret,
            token_ttl,
        })
    }

    /// Configuration over a fresh in-memory store.
    #[cfg(test)]
    pub fn in_memory(bind_addr: SocketAddr, secret: &[u8]) -> Self {
        Self {
            bind_addr,
            storage: Storage::Memory(InMemoryStore::new()),
            jwt_secret: Zeroizing::new(secret.to_vec()),
            token_ttl: Duration::from_secs(3600),
        }
    }
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
    OsRng.fill_bytes(secret.as_mut_slice());
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use ortho_config::OrthoConfig;
    use rstest::rstest;

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("storefront")]).expect("config should load")
    }

    #[rstest]
    #[tokio::test]
    async fn without_a_database_the_store_is_in_memory() {
        let _guard = lock_env([
            ("STOREFRONT_DATABASE_URL", None),
            ("STOREFRONT_JWT_SECRET", None),
            ("STOREFRONT_BIND_ADDR", Some("127.0.0.1:0".to_owned())),
        ]);
        let settings = load();

        let config = ServerConfig::from_settings(&settings)
            .await
            .expect("in-memory config");
        assert!(matches!(config.storage, Storage::Memory(_)));
        assert_eq!(config.jwt_secret.len(), EPHEMERAL_SECRET_LEN);
    }

    #[rstest]
    #[tokio::test]
    async fn configured_secret_is_used_in_memory() {
        let _guard = lock_env([
            ("STOREFRONT_DATABASE_URL", None),
            ("STOREFRONT_JWT_SECRET", Some("s3cret".to_owned())),
            ("STOREFRONT_BIND_ADDR", None),
        ]);
        let settings = load();

        let config = ServerConfig::from_settings(&settings)
            .await
            .expect("in-memory config");
        assert_eq!(config.jwt_secret.as_slice(), b"s3cret");
    }

    #[rstest]
    #[tokio::test]
    async fn database_without_secret_is_rejected() {
        let _guard = lock_env([
            (
                "STOREFRONT_DATABASE_URL",
                Some("postgres://shop@localhost/shop".to_owned()),
            ),
            ("STOREFRONT_JWT_SECRET", None),
            ("STOREFRONT_BIND_ADDR", None),
        ]);
        let settings = load();

        let err = ServerConfig::from_settings(&settings)
            .await
            .err()
            .expect("missing secret");
        assert!(matches!(err, StartupError::MissingJwtSecret));
    }

    #[rstest]
    fn ephemeral_secrets_differ() {
        assert_ne!(ephemeral_secret().as_slice(), ephemeral_secret().as_slice());
    }
}
