//! Embedded PostgreSQL for integration tests.
//!
//! Every caller receives its own database on one shared cluster, migrated
//! with the storefront's embedded migrations. Where the cluster cannot start,
//! set `SKIP_TEST_CLUSTER=1` to skip instead of failing.

use std::fmt;

use pg_embedded_setup_unpriv::TemporaryDatabase;
use storefront::outbound::persistence::run_pending_migrations;
use tokio::runtime::Runtime;

/// Truthy values: "1", "true", "yes" (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when skipping is allowed, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Create an empty database and bring its schema up to date.
///
/// The cluster bootstrap blocks, so call this outside of `runtime`.
pub fn provision_database(runtime: &Runtime) -> Result<TemporaryDatabase, String> {
    let cluster = pg_embedded_setup_unpriv::test_support::shared_cluster_handle()
        .map_err(|err| format!("start cluster: {err:?}"))?;
    let database = cluster
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4()))
        .map_err(|err| format!("create database: {err:?}"))?;
    let url = database.url().to_string();
    runtime
        .block_on(run_pending_migrations(&url))
        .map_err(|err| format!("migrate {url}: {err}"))?;
    Ok(database)
}
