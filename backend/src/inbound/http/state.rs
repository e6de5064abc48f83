//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data<HttpState>` and only see driving
//! ports, so they can be exercised against in-memory adapters.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    LoginService, OrderCommand, OrderQuery, OrderRepository, PasswordHasher, PrincipalResolver,
    ProductCommand, ProductQuery, ProductRepository, RegistrationService, TokenService,
    UserAccountCommand, UserRepository, UsersQuery,
};
use crate::domain::{AuthService, OrderService, ProductCatalogueService, UserAccountService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub principals: Arc<dyn PrincipalResolver>,
    pub products: Arc<dyn ProductQuery>,
    pub product_admin: Arc<dyn ProductCommand>,
    pub orders: Arc<dyn OrderQuery>,
    pub order_commands: Arc<dyn OrderCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn UserAccountCommand>,
}

/// Credential adapters and the clock shared by every service.
#[derive(Clone)]
pub struct Collaborators {
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Wire the domain services over one set of repositories.
    pub fn from_repositories<U, P, O>(
        users: Arc<U>,
        products: Arc<P>,
        orders: Arc<O>,
        collaborators: Collaborators,
    ) -> Self
    where
        U: UserRepository + 'static,
        P: ProductRepository + 'static,
        O: OrderRepository + 'static,
    {
        let Collaborators {
            hasher,
            tokens,
            clock,
        } = collaborators;
        let auth = Arc::new(AuthService::new(
            users.clone(),
            hasher,
            tokens,
            clock.clone(),
        ));
        let catalogue = Arc::new(ProductCatalogueService::new(products.clone(), clock.clone()));
        let ordering = Arc::new(OrderService::new(orders, products, clock.clone()));
        let accounts = Arc::new(UserAccountService::new(users, clock));

        Self {
            login: auth.clone(),
            registration: auth.clone(),
            principals: auth,
            products: catalogue.clone(),
            product_admin: catalogue,
            orders: ordering.clone(),
            order_commands: ordering,
            users: accounts.clone(),
            accounts,
        }
    }
}
