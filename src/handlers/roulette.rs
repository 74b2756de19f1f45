use crate::models::*;
use crate::services::RouletteSpinService;
use crate::utils::ThreadRngDraw;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/events/roulette/spin",
    tag = "roulette",
    request_body = SpinRequest,
    responses(
        (status = 200, description = "抽奖成功或重放已有结果", body = SpinResult),
        (status = 400, description = "INVALID_ARGUMENT / INVALID_SPIN_TYPE", body = SpinResult),
        (status = 409, description = "NO_BONUS_TICKET / DAILY_LIMIT_REACHED", body = SpinResult),
        (status = 500, description = "SPIN_FAILED", body = SpinResult)
    )
)]
/// 抽奖。同一 request_id 重复提交返回首次结果，`idempotent = true`。
pub async fn spin(
    service: web::Data<RouletteSpinService>,
    body: web::Json<SpinRequest>,
) -> Result<HttpResponse> {
    let result = match SpinCommand::try_from(&body.into_inner()) {
        Ok(cmd) => service.spin_with(&cmd, &mut ThreadRngDraw).await,
        Err(code) => SpinResult::failure(code, code.default_message()),
    };
    Ok(HttpResponse::build(result.status()).json(result))
}

#[utoipa::path(
    get,
    path = "/events/{event_id}/roulette/rewards",
    tag = "roulette",
    params(
        ("event_id" = i64, Path, description = "活动 ID")
    ),
    responses(
        (status = 200, description = "启用中的奖励列表", body = [RewardResponse]),
        (status = 400, description = "event_id 非法")
    )
)]
pub async fn list_rewards(
    service: web::Data<RouletteSpinService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.list_active_rewards(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn roulette_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("/roulette/spin", web::post().to(spin))
            .route("/{event_id}/roulette/rewards", web::get().to(list_rewards)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DbPool, mock::shared};
    use crate::entities::{RewardType, reward_entity};
    use crate::handlers::json_config;
    use actix_web::{App, http::StatusCode, test};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn app_data(db: DbPool) -> web::Data<RouletteSpinService> {
        web::Data::new(RouletteSpinService::new(db))
    }

    #[actix_web::test]
    async fn test_spin_rejects_unknown_type_with_400() {
        let db = shared(MockDatabase::new(DatabaseBackend::Postgres));
        let app = test::init_service(
            App::new()
                .app_data(app_data(db))
                .app_data(json_config())
                .configure(roulette_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/events/roulette/spin")
            .set_json(serde_json::json!({
                "event_id": 1,
                "user_id": 7,
                "spin_type": "weekly",
                "request_id": "req-1"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "INVALID_SPIN_TYPE");
    }

    #[actix_web::test]
    async fn test_spin_missing_request_id_is_invalid_argument() {
        let db = shared(MockDatabase::new(DatabaseBackend::Postgres));
        let app = test::init_service(
            App::new()
                .app_data(app_data(db))
                .app_data(json_config())
                .configure(roulette_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/events/roulette/spin")
            .set_json(serde_json::json!({
                "event_id": 1,
                "user_id": 7,
                "spin_type": "daily"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
    }

    #[actix_web::test]
    async fn test_spin_malformed_body_is_invalid_argument() {
        let db = shared(MockDatabase::new(DatabaseBackend::Postgres));
        let app = test::init_service(
            App::new()
                .app_data(app_data(db))
                .app_data(json_config())
                .configure(roulette_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/events/roulette/spin")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"event_id\": \"one\"}")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
    }

    #[actix_web::test]
    async fn test_list_rewards_returns_catalog() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![reward_entity::Model {
                    id: 1,
                    event_id: 3,
                    reward_id: "P100".to_string(),
                    reward_type: RewardType::Point,
                    reward_value: 100,
                    weight: 10,
                    is_active: true,
                    created_at: None,
                }]]),
        );
        let app =
            test::init_service(App::new().app_data(app_data(db)).configure(roulette_config)).await;

        let req = test::TestRequest::get()
            .uri("/events/3/roulette/rewards")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"][0]["reward_id"], "P100");
        assert_eq!(body["data"][0]["reward_type"], "point");
    }
}
