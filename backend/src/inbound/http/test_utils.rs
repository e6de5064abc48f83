//! Test harness for HTTP handlers: in-memory repositories behind the real
//! credential adapters.

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use mockable::DefaultClock;
use serde_json::Value;

use crate::domain::ports::{PasswordHasher, ProductRepository, TokenService, UserRepository};
use crate::domain::{Email, Principal, Product, User, UserDraft, UserId, UserRole};
use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::state::{Collaborators, HttpState};
use crate::middleware::Trace;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenService};
use crate::test_support::{fixed_now, product};

/// Password given to every seeded account.
pub const PASSWORD: &str = "correct horse";

pub struct TestApp {
    store: InMemoryStore,
    hasher: Arc<Argon2PasswordHasher>,
    tokens: Arc<JwtTokenService>,
    state: HttpState,
}

impl TestApp {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let hasher = Arc::new(Argon2PasswordHasher::new());
        let tokens = Arc::new(JwtTokenService::new(
            b"test-signing-secret",
            Duration::from_secs(3600),
            Arc::new(DefaultClock),
        ));
        let state = HttpState::from_repositories(
            Arc::new(store.users()),
            Arc::new(store.products()),
            Arc::new(store.orders()),
            Collaborators {
                hasher: hasher.clone(),
                tokens: tokens.clone(),
                clock: Arc::new(DefaultClock),
            },
        );
        Self {
            store,
            hasher,
            tokens,
            state,
        }
    }

    /// Application wired the way the server wires it, minus health and docs.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .wrap(Trace)
            .service(super::api_scope())
    }

    pub async fn seed_customer(&self, email: &str) -> (User, String) {
        self.seed_user(email, UserRole::Customer).await
    }

    pub async fn seed_admin(&self, email: &str) -> (User, String) {
        self.seed_user(email, UserRole::Admin).await
    }

    /// Store an account whose password is [`PASSWORD`] and mint a token for it.
    async fn seed_user(&self, email: &str, role: UserRole) -> (User, String) {
        let user = User::new(UserDraft {
            id: UserId::random(),
            email: Email::parse(email).expect("seed email"),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            password_hash: self.hasher.hash(PASSWORD).expect("hash seed password"),
            role,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        })
        .expect("seed user");
        self.store
            .users()
            .create(&user)
            .await
            .expect("store seed user");
        let principal = Principal::new(*user.id(), user.email().clone(), user.role());
        let token = self.tokens.issue(&principal).expect("issue seed token");
        (user, token.into_inner())
    }

    pub async fn seed_product(&self, name: &str, price_cents: i64, stock: i64) -> Product {
        let product = product(name, price_cents, stock);
        self.store
            .products()
            .create(&product)
            .await
            .expect("store seed product");
        product
    }
}

/// Read a response body as JSON.
pub async fn read_json(res: ServiceResponse<impl MessageBody>) -> Value {
    let bytes = actix_web::test::read_body(res).await;
    serde_json::from_slice(&bytes).expect("JSON response body")
}
