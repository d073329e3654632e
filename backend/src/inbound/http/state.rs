//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{PropertyEntitlementQuery, TiersCommand, TiersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Tier reads.
    pub tiers: Arc<dyn TiersQuery>,
    /// Tier administration and user assignment.
    pub tiers_command: Arc<dyn TiersCommand>,
    /// Property quota checks.
    pub entitlements: Arc<dyn PropertyEntitlementQuery>,
}

impl HttpState {
    /// Construct state from individual ports.
    pub fn new(
        tiers: Arc<dyn TiersQuery>,
        tiers_command: Arc<dyn TiersCommand>,
        entitlements: Arc<dyn PropertyEntitlementQuery>,
    ) -> Self {
        Self {
            tiers,
            tiers_command,
            entitlements,
        }
    }

    /// Serve every port from one service.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use landlord_backend::domain::TierService;
    /// use landlord_backend::inbound::http::state::HttpState;
    /// use landlord_backend::outbound::memory::{
    ///     InMemoryStore, InMemoryTierRepository, InMemoryUserDirectory,
    /// };
    ///
    /// let store = InMemoryStore::default();
    /// let service = TierService::new(
    ///     Arc::new(InMemoryTierRepository::new(store.clone())),
    ///     Arc::new(InMemoryUserDirectory::new(store)),
    /// );
    /// let state = HttpState::from_service(Arc::new(service));
    /// let _tiers = state.tiers.clone();
    /// ```
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: TiersQuery + TiersCommand + PropertyEntitlementQuery + 'static,
    {
        Self {
            tiers: service.clone(),
            tiers_command: service.clone(),
            entitlements: service,
        }
    }
}
