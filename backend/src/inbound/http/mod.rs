//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod tiers;
pub mod users;
pub mod validation;


use actix_web::web;

pub use error::ApiResult;

/// The `/api/v1` scope with every tier and entitlement handler.
///
/// JSON bodies that fail to deserialise are answered with an
/// `invalid_request` error payload.
pub fn api_scope() -> actix_web::Scope {
    web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(tiers::list_tiers)
        // Registered before `/tiers/{id}` so "default" is not parsed as an id.
        .service(tiers::get_default_tier)
        .service(tiers::get_tier)
        .service(tiers::create_tier)
        .service(tiers::update_tier)
        .service(tiers::delete_tier)
        .service(users::assign_tier)
        .service(users::property_entitlement)
}
