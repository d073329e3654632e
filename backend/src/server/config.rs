//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use landlord_backend::outbound::memory::InMemoryStore;
use landlord_backend::outbound::persistence::DbPool;

/// Backing store the driven ports are built on.
#[derive(Clone)]
pub enum Persistence {
    /// PostgreSQL through the Diesel adapters.
    Postgres(DbPool),
    /// Process-local store; contents are lost on restart.
    Memory(InMemoryStore),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) persistence: Persistence,
}

impl ServerConfig {
    /// Construct a configuration backed by a fresh in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            persistence: Persistence::Memory(InMemoryStore::default()),
        }
    }

    /// Attach a database connection pool for the Diesel adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.persistence = Persistence::Postgres(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the configured backing store.
    #[must_use]
    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }
}
