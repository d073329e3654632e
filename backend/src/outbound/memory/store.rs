//! Shared state behind the in-memory adapters.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{PropertyId, Tier, TierId, UserId};

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) tiers: BTreeMap<TierId, Tier>,
    pub(crate) next_tier_id: i64,
    pub(crate) users: BTreeMap<UserId, Option<TierId>>,
    pub(crate) ownerships: BTreeMap<UserId, BTreeSet<PropertyId>>,
}

impl StoreState {
    pub(crate) fn allocate_tier_id(&mut self) -> TierId {
        self.next_tier_id += 1;
        TierId::new(self.next_tier_id)
    }

    /// Unset `is_default` on every default tier except `except`.
    pub(crate) fn clear_default_flags(&mut self, except: Option<TierId>) -> usize {
        let mut cleared = 0;
        for tier in self.tiers.values_mut() {
            if tier.is_default && Some(tier.id) != except {
                tier.is_default = false;
                cleared += 1;
            }
        }
        cleared
    }

    pub(crate) fn tier_is_referenced(&self, id: TierId) -> bool {
        self.users.values().any(|tier_id| *tier_id == Some(id))
    }
}

/// Cloneable handle to the shared in-memory state.
///
/// # Examples
/// ```
/// use landlord_backend::domain::{PropertyId, UserId};
/// use landlord_backend::outbound::memory::InMemoryStore;
///
/// let store = InMemoryStore::default();
/// store.insert_user(UserId::new(7), None).expect("store available");
/// store
///     .add_ownership(UserId::new(7), PropertyId::new(1))
///     .expect("store available");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

/// The store mutex was poisoned by a panicking writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("in-memory store lock poisoned")]
pub struct StorePoisoned;

impl InMemoryStore {
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StorePoisoned> {
        self.state.lock().map_err(|_| StorePoisoned)
    }

    /// Register a user, optionally assigned to a tier.
    ///
    /// An existing user keeps their ownerships and gets the new assignment.
    ///
    /// # Errors
    ///
    /// [`StorePoisoned`] when a previous writer panicked.
    pub fn insert_user(&self, id: UserId, tier_id: Option<TierId>) -> Result<(), StorePoisoned> {
        self.lock()?.users.insert(id, tier_id);
        Ok(())
    }

    /// Record that `user` holds `property`. Registers the user if needed.
    ///
    /// # Errors
    ///
    /// [`StorePoisoned`] when a previous writer panicked.
    pub fn add_ownership(&self, user: UserId, property: PropertyId) -> Result<(), StorePoisoned> {
        let mut state = self.lock()?;
        state.users.entry(user).or_insert(None);
        state.ownerships.entry(user).or_default().insert(property);
        Ok(())
    }
}
