//! HTTP handlers for the pricing facade

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_helpers::{ErrorResponse, UuidPath, ValidatedJson};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::PricingResult;
use crate::location::LocationProvider;
use crate::models::{
    AddressRequest, Currency, LocationResult, PriceSchedule, PricingQuote, PricingZone, Tier,
    TierPrice,
};
use crate::repository::LockRepository;
use crate::service::PricingService;

pub const TAG: &str = "pricing";

/// OpenAPI documentation for the pricing API
#[derive(OpenApi)]
#[openapi(
    paths(
        preview_pricing,
        complete_registration,
        effective_pricing,
        reevaluate_pricing,
    ),
    components(schemas(
        AddressRequest,
        PricingQuote,
        PricingZone,
        PriceSchedule,
        Tier,
        TierPrice,
        Currency,
        LocationResult,
        ErrorResponse,
    )),
    tags((name = TAG, description = "Regional pricing resolution and account locks"))
)]
pub struct ApiDoc;

type SharedService<R, P> = State<Arc<PricingService<R, P>>>;

/// Pricing routes, relative to where the caller nests them
pub fn router<R, P>(service: PricingService<R, P>) -> Router
where
    R: LockRepository + 'static,
    P: LocationProvider + 'static,
{
    Router::new()
        .route("/preview", post(preview_pricing::<R, P>))
        .route("/accounts/{account_id}", get(effective_pricing::<R, P>))
        .route(
            "/accounts/{account_id}/registration",
            post(complete_registration::<R, P>),
        )
        .route(
            "/accounts/{account_id}/reevaluate",
            post(reevaluate_pricing::<R, P>),
        )
        .with_state(Arc::new(service))
}

/// Quote for the caller's current location without locking
#[utoipa::path(
    post,
    path = "/preview",
    tag = TAG,
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Unlocked pricing for the resolved zone", body = PricingQuote),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn preview_pricing<R: LockRepository + 'static, P: LocationProvider + 'static>(
    State(service): SharedService<R, P>,
    ValidatedJson(input): ValidatedJson<AddressRequest>,
) -> PricingResult<Json<PricingQuote>> {
    let quote = service.preview_pricing(&input.address).await?;
    Ok(Json(quote))
}

/// Lock the account to the zone of its registration location
#[utoipa::path(
    post,
    path = "/accounts/{account_id}/registration",
    tag = TAG,
    params(
        ("account_id" = Uuid, Path, description = "Account ID")
    ),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Locked pricing; an existing lock is returned unchanged", body = PricingQuote),
        (status = 400, description = "Invalid account ID or request body", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn complete_registration<R: LockRepository + 'static, P: LocationProvider + 'static>(
    State(service): SharedService<R, P>,
    UuidPath(account_id): UuidPath,
    ValidatedJson(input): ValidatedJson<AddressRequest>,
) -> PricingResult<Json<PricingQuote>> {
    let quote = service
        .complete_registration(account_id, &input.address)
        .await?;
    Ok(Json(quote))
}

/// Locked pricing for an account
#[utoipa::path(
    get,
    path = "/accounts/{account_id}",
    tag = TAG,
    params(
        ("account_id" = Uuid, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Locked pricing", body = PricingQuote),
        (status = 400, description = "Invalid account ID", body = ErrorResponse),
        (status = 404, description = "Account has not completed registration", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn effective_pricing<R: LockRepository + 'static, P: LocationProvider + 'static>(
    State(service): SharedService<R, P>,
    UuidPath(account_id): UuidPath,
) -> PricingResult<Json<PricingQuote>> {
    let quote = service.effective_pricing(account_id).await?;
    Ok(Json(quote))
}

/// Re-resolve a provisional lock inside its grace window
#[utoipa::path(
    post,
    path = "/accounts/{account_id}/reevaluate",
    tag = TAG,
    params(
        ("account_id" = Uuid, Path, description = "Account ID")
    ),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Current lock, finalized if re-evaluation applied", body = PricingQuote),
        (status = 400, description = "Invalid account ID or request body", body = ErrorResponse),
        (status = 404, description = "Account has not completed registration", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn reevaluate_pricing<R: LockRepository + 'static, P: LocationProvider + 'static>(
    State(service): SharedService<R, P>,
    UuidPath(account_id): UuidPath,
    ValidatedJson(input): ValidatedJson<AddressRequest>,
) -> PricingResult<Json<PricingQuote>> {
    let quote = service
        .reevaluate_pricing(account_id, &input.address)
        .await?;
    Ok(Json(quote))
}
