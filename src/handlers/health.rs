use crate::models::{ApiResponse, HealthStatus};
use actix_web::{HttpResponse, Result, web};

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "服务存活", body = HealthStatus)
    )
)]
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(HealthStatus {
        status: "up".to_string(),
    })))
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
