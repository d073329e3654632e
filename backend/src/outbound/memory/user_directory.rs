//! In-memory `UserDirectory`.

use async_trait::async_trait;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{
    PropertyOwnership, UserAccount, UserId, UserRelation, UserSearchCriteria, UserUpdate,
};

use super::InMemoryStore;
use super::store::StorePoisoned;

/// User directory over an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryUserDirectory {
    store: InMemoryStore,
}

impl InMemoryUserDirectory {
    /// Create a directory over `store`.
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

impl From<StorePoisoned> for UserDirectoryError {
    fn from(error: StorePoisoned) -> Self {
        Self::connection(error.to_string())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_one(
        &self,
        id: UserId,
        relations: &[UserRelation],
    ) -> Result<Option<UserAccount>, UserDirectoryError> {
        let state = self.store.lock()?;
        let Some(tier_id) = state.users.get(&id).copied() else {
            return Ok(None);
        };

        let mut account = UserAccount {
            tier_id,
            ..UserAccount::new(id)
        };
        if relations.contains(&UserRelation::Tier) {
            account.tier = tier_id.and_then(|tier_id| state.tiers.get(&tier_id).cloned());
        }
        if relations.contains(&UserRelation::Ownerships) {
            account.ownerships = state
                .ownerships
                .get(&id)
                .into_iter()
                .flatten()
                .map(|property_id| PropertyOwnership {
                    property_id: *property_id,
                })
                .collect();
        }
        Ok(Some(account))
    }

    async fn search(
        &self,
        criteria: &UserSearchCriteria,
    ) -> Result<Vec<UserAccount>, UserDirectoryError> {
        let state = self.store.lock()?;
        Ok(state
            .users
            .iter()
            .filter(|(_, tier_id)| criteria.tier_id.is_none_or(|wanted| **tier_id == Some(wanted)))
            .map(|(id, tier_id)| UserAccount {
                tier_id: *tier_id,
                ..UserAccount::new(*id)
            })
            .collect())
    }

    async fn update(&self, id: UserId, update: UserUpdate) -> Result<(), UserDirectoryError> {
        let mut state = self.store.lock()?;
        if let Some(tier_id) = update.tier_id
            && !state.tiers.contains_key(&tier_id)
        {
            return Err(UserDirectoryError::unknown_tier(tier_id.get()));
        }
        let Some(assigned) = state.users.get_mut(&id) else {
            return Err(UserDirectoryError::missing(id.get()));
        };
        if let Some(tier_id) = update.tier_id {
            *assigned = Some(tier_id);
        }
        Ok(())
    }
}
