//! User tier assignment and entitlement HTTP handlers.
//!
//! ```text
//! PUT /api/v1/users/{id}/tier
//! GET /api/v1/users/{id}/entitlements/properties
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{TierId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require};

/// Request payload for assigning a tier to a user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssignTierRequest {
    /// Tier to assign.
    pub tier_id: Option<i64>,
}

/// Whether the user may create another property.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyEntitlementResponse {
    /// User the answer applies to.
    pub user_id: i64,
    /// `true` when one more property fits the user's quota.
    pub can_create_property: bool,
}

/// Assign a tier to a user.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/tier",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = AssignTierRequest,
    responses(
        (status = 204, description = "Tier assigned"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Tier or user not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "assignUserTier"
)]
#[put("/users/{id}/tier")]
pub async fn assign_tier(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<AssignTierRequest>,
) -> ApiResult<HttpResponse> {
    let tier_id = require(payload.into_inner().tier_id, FieldName::new("tierId"))?;
    state
        .tiers_command
        .assign_tier_to_user(UserId::new(path.into_inner()), TierId::new(tier_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Check whether a user may create another property.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/entitlements/properties",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Quota decision", body = PropertyEntitlementResponse)
    ),
    tags = ["users"],
    operation_id = "getPropertyEntitlement"
)]
#[get("/users/{id}/entitlements/properties")]
pub async fn property_entitlement(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> web::Json<PropertyEntitlementResponse> {
    let user_id = UserId::new(path.into_inner());
    let can_create_property = state.entitlements.can_create_property(user_id).await;
    web::Json(PropertyEntitlementResponse {
        user_id: user_id.get(),
        can_create_property,
    })
}
