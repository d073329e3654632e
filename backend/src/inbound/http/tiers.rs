//! Tier HTTP handlers.
//!
//! ```text
//! GET    /api/v1/tiers
//! GET    /api/v1/tiers/default
//! GET    /api/v1/tiers/{id}
//! POST   /api/v1/tiers
//! PUT    /api/v1/tiers/{id}
//! DELETE /api/v1/tiers/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, NewTier, Price, PropertyQuota, Tier, TierChanges, TierId, TierName,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ErrorCode, FieldName, invalid_field_error, require};

const NAME: FieldName = FieldName::new("name");
const PRICE: FieldName = FieldName::new("price");
const MAX_PROPERTIES: FieldName = FieldName::new("maxProperties");

/// Request payload for creating or replacing a tier.
///
/// Unknown fields are rejected so clients cannot smuggle in an `id`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TierRequest {
    /// Display label.
    #[schema(example = "Basic")]
    pub name: Option<String>,
    /// Non-negative decimal price, as a string or number.
    #[schema(value_type = String, example = "4.99")]
    pub price: Option<Decimal>,
    /// Property quota; `0` means unlimited.
    #[schema(example = 5)]
    pub max_properties: Option<i64>,
    /// Listing order, `0` when omitted on create.
    pub sort_order: Option<i32>,
    /// Make this the default tier.
    pub is_default: Option<bool>,
}

/// Tier representation returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierResponse {
    /// Tier identifier.
    pub id: i64,
    /// Display label.
    pub name: String,
    /// Decimal price rendered as a string.
    #[schema(example = "4.99")]
    pub price: String,
    /// Property quota; `0` means unlimited.
    pub max_properties: u32,
    /// Listing order.
    pub sort_order: i32,
    /// Whether this is the default tier.
    pub is_default: bool,
}

impl From<Tier> for TierResponse {
    fn from(value: Tier) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into(),
            price: value.price.amount().to_string(),
            max_properties: value.max_properties.get(),
            sort_order: value.sort_order,
            is_default: value.is_default,
        }
    }
}

/// The default tier, or `null` when none is flagged.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DefaultTierResponse {
    /// Default tier, if any.
    pub tier: Option<TierResponse>,
}

#[derive(Debug)]
struct ParsedTier {
    name: TierName,
    price: Price,
    max_properties: PropertyQuota,
    sort_order: Option<i32>,
    is_default: Option<bool>,
}

fn parse_tier_request(payload: TierRequest) -> Result<ParsedTier, Error> {
    let name = require(payload.name, NAME)?;
    let price = require(payload.price, PRICE)?;
    let max_properties = require(payload.max_properties, MAX_PROPERTIES)?;

    let name = TierName::new(name)
        .map_err(|err| invalid_field_error(NAME, err.to_string(), ErrorCode::EmptyName))?;
    let price = Price::new(price)
        .map_err(|err| invalid_field_error(PRICE, err.to_string(), ErrorCode::NegativePrice))?;
    let max_properties = u32::try_from(max_properties)
        .map(PropertyQuota::new)
        .map_err(|_| {
            invalid_field_error(
                MAX_PROPERTIES,
                "maxProperties must be a non-negative integer",
                ErrorCode::InvalidQuota,
            )
        })?;

    Ok(ParsedTier {
        name,
        price,
        max_properties,
        sort_order: payload.sort_order,
        is_default: payload.is_default,
    })
}

impl From<ParsedTier> for NewTier {
    fn from(value: ParsedTier) -> Self {
        NewTier::new(value.name, value.price, value.max_properties)
            .with_sort_order(value.sort_order.unwrap_or(0))
            .with_default(value.is_default.unwrap_or(false))
    }
}

impl From<ParsedTier> for TierChanges {
    fn from(value: ParsedTier) -> Self {
        Self {
            name: Some(value.name),
            price: Some(value.price),
            max_properties: Some(value.max_properties),
            sort_order: value.sort_order,
            is_default: value.is_default,
        }
    }
}

/// List tiers ordered by sort order, then id.
#[utoipa::path(
    get,
    path = "/api/v1/tiers",
    responses(
        (status = 200, description = "Tiers in listing order", body = [TierResponse]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["tiers"],
    operation_id = "listTiers"
)]
#[get("/tiers")]
pub async fn list_tiers(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<TierResponse>>> {
    let tiers = state.tiers.list_tiers().await?;
    Ok(web::Json(tiers.into_iter().map(TierResponse::from).collect()))
}

/// Fetch the default tier.
#[utoipa::path(
    get,
    path = "/api/v1/tiers/default",
    responses(
        (status = 200, description = "Default tier, possibly null", body = DefaultTierResponse),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["tiers"],
    operation_id = "getDefaultTier"
)]
#[get("/tiers/default")]
pub async fn get_default_tier(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<DefaultTierResponse>> {
    let tier = state.tiers.get_default_tier().await?;
    Ok(web::Json(DefaultTierResponse {
        tier: tier.map(TierResponse::from),
    }))
}

/// Fetch a tier by id.
#[utoipa::path(
    get,
    path = "/api/v1/tiers/{id}",
    params(("id" = i64, Path, description = "Tier identifier")),
    responses(
        (status = 200, description = "Tier", body = TierResponse),
        (status = 404, description = "Tier not found", body = ErrorSchema)
    ),
    tags = ["tiers"],
    operation_id = "getTier"
)]
#[get("/tiers/{id}")]
pub async fn get_tier(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<TierResponse>> {
    let tier = state.tiers.get_tier(TierId::new(path.into_inner())).await?;
    Ok(web::Json(TierResponse::from(tier)))
}

/// Create a tier. A default tier demotes the current default.
#[utoipa::path(
    post,
    path = "/api/v1/tiers",
    request_body = TierRequest,
    responses(
        (status = 201, description = "Created tier", body = TierResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["tiers"],
    operation_id = "createTier"
)]
#[post("/tiers")]
pub async fn create_tier(
    state: web::Data<HttpState>,
    payload: web::Json<TierRequest>,
) -> ApiResult<HttpResponse> {
    let parsed = parse_tier_request(payload.into_inner())?;
    let tier = state.tiers_command.create_tier(parsed.into()).await?;
    Ok(HttpResponse::Created().json(TierResponse::from(tier)))
}

/// Replace a tier's fields. Omitted optional fields keep their value.
#[utoipa::path(
    put,
    path = "/api/v1/tiers/{id}",
    params(("id" = i64, Path, description = "Tier identifier")),
    request_body = TierRequest,
    responses(
        (status = 200, description = "Updated tier", body = TierResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Tier not found", body = ErrorSchema)
    ),
    tags = ["tiers"],
    operation_id = "updateTier"
)]
#[put("/tiers/{id}")]
pub async fn update_tier(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<TierRequest>,
) -> ApiResult<web::Json<TierResponse>> {
    let parsed = parse_tier_request(payload.into_inner())?;
    let tier = state
        .tiers_command
        .update_tier(TierId::new(path.into_inner()), parsed.into())
        .await?;
    Ok(web::Json(TierResponse::from(tier)))
}

/// Delete a tier no user is assigned to.
#[utoipa::path(
    delete,
    path = "/api/v1/tiers/{id}",
    params(("id" = i64, Path, description = "Tier identifier")),
    responses(
        (status = 204, description = "Tier deleted"),
        (status = 400, description = "Tier has assigned users", body = ErrorSchema),
        (status = 404, description = "Tier not found", body = ErrorSchema)
    ),
    tags = ["tiers"],
    operation_id = "deleteTier"
)]
#[delete("/tiers/{id}")]
pub async fn delete_tier(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .tiers_command
        .delete_tier(TierId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn request(max_properties: i64) -> TierRequest {
        TierRequest {
            name: Some("Basic".to_owned()),
            price: Some(Decimal::new(499, 2)),
            max_properties: Some(max_properties),
            ..TierRequest::default()
        }
    }

    #[rstest]
    fn create_defaults_optional_fields() {
        let new_tier: NewTier = parse_tier_request(request(5)).expect("valid").into();
        assert_eq!(new_tier.sort_order, 0);
        assert!(!new_tier.is_default);
        assert_eq!(new_tier.max_properties, PropertyQuota::new(5));
    }

    #[rstest]
    fn update_leaves_omitted_optional_fields_unset() {
        let changes: TierChanges = parse_tier_request(request(5)).expect("valid").into();
        assert_eq!(changes.sort_order, None);
        assert_eq!(changes.is_default, None);
        assert!(changes.name.is_some());
    }

    #[rstest]
    #[case(-1)]
    #[case(i64::from(u32::MAX) + 1)]
    fn out_of_range_quota_is_rejected(#[case] max_properties: i64) {
        let error = parse_tier_request(request(max_properties)).expect_err("invalid quota");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "maxProperties", "code": "invalid_quota"}))
        );
    }

    #[rstest]
    fn negative_price_is_rejected() {
        let payload = TierRequest {
            price: Some(Decimal::new(-1, 0)),
            ..request(1)
        };
        let error = parse_tier_request(payload).expect_err("negative price");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "price", "code": "negative_price"}))
        );
    }

    #[rstest]
    fn unknown_fields_are_rejected() {
        let result: Result<TierRequest, _> = serde_json::from_value(json!({
            "name": "Basic",
            "price": "4.99",
            "maxProperties": 5,
            "id": 99
        }));
        assert!(result.is_err());
    }
}
