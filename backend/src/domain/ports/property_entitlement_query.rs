//! Driving port for property quota checks.

use async_trait::async_trait;

use crate::domain::UserId;

/// Answers whether a user may create another property.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyEntitlementQuery: Send + Sync {
    /// `true` when one more property fits the user's effective quota.
    ///
    /// Never fails: with no tier configured at all the answer is `true`, and
    /// an unresolvable user or an unavailable store yields `false`.
    async fn can_create_property(&self, user_id: UserId) -> bool;
}
