use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Regional Pricing API",
        version = "0.1.0",
        description = "Location-based pricing zones with write-once account locks"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/pricing", api = domain_pricing::ApiDoc)
    )
)]
pub struct ApiDoc;
