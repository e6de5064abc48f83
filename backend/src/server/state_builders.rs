//! Builders wiring repositories and credential adapters into [`HttpState`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use storefront::inbound::http::state::{Collaborators, HttpState};
use storefront::outbound::persistence::{
    DieselOrderRepository, DieselProductRepository, DieselUserRepository,
};
use storefront::outbound::security::{Argon2PasswordHasher, JwtTokenService};

use super::ServerConfig;
use super::config::Storage;

fn collaborators(config: &ServerConfig, clock: Arc<dyn Clock>) -> Collaborators {
    Collaborators {
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: Arc::new(JwtTokenService::new(
            &config.jwt_secret,
            config.token_ttl,
            clock.clone(),
        )),
        clock,
    }
}

/// Build handler state over the configured storage backend.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let collaborators = collaborators(config, Arc::new(DefaultClock));
    match &config.storage {
        Storage::Postgres(pool) => HttpState::from_repositories(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselProductRepository::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool.clone())),
            collaborators,
        ),
        Storage::Memory(store) => HttpState::from_repositories(
            Arc::new(store.users()),
            Arc::new(store.products()),
            Arc::new(store.orders()),
            collaborators,
        ),
    }
}
