//! In-memory `TierRepository`.

use async_trait::async_trait;

use crate::domain::ports::{SeedingResult, TierRepository, TierRepositoryError};
use crate::domain::{NewTier, Tier, TierId, sort_for_listing};

use super::InMemoryStore;
use super::store::{StorePoisoned, StoreState};

/// Tier repository over an [`InMemoryStore`].
///
/// Every write runs under the store lock, so default demotion and the write
/// that triggers it are observed together.
#[derive(Debug, Clone)]
pub struct InMemoryTierRepository {
    store: InMemoryStore,
}

impl InMemoryTierRepository {
    /// Create a repository over `store`.
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

impl From<StorePoisoned> for TierRepositoryError {
    fn from(error: StorePoisoned) -> Self {
        Self::connection(error.to_string())
    }
}

fn insert_locked(state: &mut StoreState, tier: NewTier) -> Tier {
    if tier.is_default {
        state.clear_default_flags(None);
    }
    let id = state.allocate_tier_id();
    let tier = tier.into_tier(id);
    state.tiers.insert(id, tier.clone());
    tier
}

#[async_trait]
impl TierRepository for InMemoryTierRepository {
    async fn list_ordered(&self) -> Result<Vec<Tier>, TierRepositoryError> {
        let mut tiers: Vec<Tier> = self.store.lock()?.tiers.values().cloned().collect();
        sort_for_listing(&mut tiers);
        Ok(tiers)
    }

    async fn find_by_id(&self, id: TierId) -> Result<Option<Tier>, TierRepositoryError> {
        Ok(self.store.lock()?.tiers.get(&id).cloned())
    }

    async fn find_default(&self) -> Result<Option<Tier>, TierRepositoryError> {
        Ok(self
            .store
            .lock()?
            .tiers
            .values()
            .find(|tier| tier.is_default)
            .cloned())
    }

    async fn insert(&self, tier: NewTier) -> Result<Tier, TierRepositoryError> {
        let mut state = self.store.lock()?;
        Ok(insert_locked(&mut state, tier))
    }

    async fn insert_many(&self, tiers: Vec<NewTier>) -> Result<SeedingResult, TierRepositoryError> {
        let mut state = self.store.lock()?;
        if !state.tiers.is_empty() {
            return Ok(SeedingResult::AlreadySeeded);
        }
        for tier in tiers {
            insert_locked(&mut state, tier);
        }
        Ok(SeedingResult::Applied)
    }

    async fn save(&self, tier: &Tier) -> Result<Tier, TierRepositoryError> {
        let mut state = self.store.lock()?;
        if !state.tiers.contains_key(&tier.id) {
            return Err(TierRepositoryError::missing(tier.id.get()));
        }
        if tier.is_default {
            state.clear_default_flags(Some(tier.id));
        }
        state.tiers.insert(tier.id, tier.clone());
        Ok(tier.clone())
    }

    async fn delete(&self, id: TierId) -> Result<bool, TierRepositoryError> {
        let mut state = self.store.lock()?;
        if state.tier_is_referenced(id) {
            return Err(TierRepositoryError::tier_in_use(id.get()));
        }
        Ok(state.tiers.remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64, TierRepositoryError> {
        let total = self.store.lock()?.tiers.len();
        u64::try_from(total).map_err(|_| TierRepositoryError::query("tier count overflow"))
    }
}
