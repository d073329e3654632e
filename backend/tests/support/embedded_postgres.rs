//! Database provisioning and seeding against an embedded cluster.
//!
//! Schema setup goes through the crate's own migration runner so tests see
//! exactly what the server applies at startup. Seeding uses the synchronous
//! `postgres` client for rows the ports never write (users, ownerships).

use landlord_backend::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

use super::format_postgres_error;

/// Create a fresh, migrated database and return its URL.
pub fn provision_database(cluster: &TestCluster, runtime: &Runtime) -> Result<String, String> {
    let connection = cluster.connection();
    let name = format!("landlord_test_{}", Uuid::new_v4().simple());
    execute_sql(
        &connection.database_url("postgres"),
        &format!("CREATE DATABASE {name}"),
    )?;

    let url = connection.database_url(&name);
    runtime
        .block_on(run_pending_migrations(&url))
        .map_err(|err| err.to_string())?;
    Ok(url)
}

/// Run one or more statements outside any repository.
pub fn execute_sql(url: &str, sql: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(sql)
        .map_err(|err| format_postgres_error(&err))
}

/// Insert a user row, optionally assigned to a tier.
pub fn insert_user(url: &str, user_id: i64, tier_id: Option<i64>) -> Result<(), String> {
    let tier = tier_id.map_or_else(|| "NULL".to_owned(), |id| id.to_string());
    execute_sql(
        url,
        &format!("INSERT INTO users (id, tier_id) VALUES ({user_id}, {tier});"),
    )
}
