//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every tier, user and health endpoint from the
//! inbound layer together with the request, response and error schemas.
//! Swagger UI serves it in debug builds and `openapi-dump` prints it for
//! external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::tiers::{DefaultTierResponse, TierRequest, TierResponse};
use crate::inbound::http::users::{AssignTierRequest, PropertyEntitlementResponse};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Landlord tier entitlements API",
        description = "Subscription tier catalogue, tier assignment and property-quota checks.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::tiers::list_tiers,
        crate::inbound::http::tiers::get_default_tier,
        crate::inbound::http::tiers::get_tier,
        crate::inbound::http::tiers::create_tier,
        crate::inbound::http::tiers::update_tier,
        crate::inbound::http::tiers::delete_tier,
        crate::inbound::http::users::assign_tier,
        crate::inbound::http::users::property_entitlement,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        TierRequest,
        TierResponse,
        DefaultTierResponse,
        AssignTierRequest,
        PropertyEntitlementResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "tiers", description = "Subscription tier catalogue"),
        (name = "users", description = "Tier assignment and entitlements"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
