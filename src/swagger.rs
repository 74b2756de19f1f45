use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{GrantSourceType, GrantStatus, RewardType, SpinType};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "gm_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-GM-KEY"))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::roulette::spin,
        handlers::roulette::list_rewards,
        handlers::gm::list_pending,
        handlers::gm::approve,
        handlers::gm::reject,
        handlers::gm::issue_bonus_tickets,
    ),
    components(
        schemas(
            HealthStatus,
            ApiError,
            SpinRequest,
            SpinResult,
            SpinData,
            SpinView,
            GrantRef,
            RewardResponse,
            RewardType,
            SpinType,
            GrantStatus,
            GrantSourceType,
            GrantSummary,
            PendingGrantQuery,
            ApproveGrantRequest,
            RejectGrantRequest,
            DecisionResult,
            IssueBonusTicketsRequest,
            IssueBonusTicketsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "roulette", description = "Roulette spin API"),
        (name = "gm", description = "Operator grant review and ticket issuance"),
    ),
    info(
        title = "Roulette Backend API",
        version = "1.0.0",
        description = "Roulette spin issuance REST API documentation"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
