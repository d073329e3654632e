//! Driven port for the external user directory.

use async_trait::async_trait;

use crate::domain::{UserAccount, UserId, UserRelation, UserSearchCriteria, UserUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } => "user directory connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user directory query failed: {message}",
        /// The user targeted by an update does not exist.
        Missing { user_id: i64 } => "user {user_id} does not exist",
        /// The tier an update assigns does not exist.
        UnknownTier { tier_id: i64 } => "tier {tier_id} does not exist",
    }
}

/// Port for reading users and writing their tier assignment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user, eagerly loading the requested relations.
    async fn find_one(
        &self,
        id: UserId,
        relations: &[UserRelation],
    ) -> Result<Option<UserAccount>, UserDirectoryError>;

    /// Users matching `criteria`, without relations loaded.
    async fn search(
        &self,
        criteria: &UserSearchCriteria,
    ) -> Result<Vec<UserAccount>, UserDirectoryError>;

    /// Apply the present fields of `update` to a user.
    async fn update(&self, id: UserId, update: UserUpdate) -> Result<(), UserDirectoryError>;
}
