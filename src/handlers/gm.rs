use crate::models::*;
use crate::services::{BonusTicketService, GmGrantService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/gm/grants/pending",
    tag = "gm",
    params(PendingGrantQuery),
    security(
        ("gm_key" = [])
    ),
    responses(
        (status = 200, description = "待审批发放记录", body = [GrantSummary]),
        (status = 401, description = "X-GM-KEY 不匹配")
    )
)]
/// 待审批列表（创建时间升序），limit 限定在 [1, 200]
pub async fn list_pending(
    service: web::Data<GmGrantService>,
    query: web::Query<PendingGrantQuery>,
) -> Result<HttpResponse> {
    match service.list_pending(&query.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/gm/grants/{grant_id}/approve",
    tag = "gm",
    params(
        ("grant_id" = i64, Path, description = "发放记录 ID")
    ),
    request_body = ApproveGrantRequest,
    security(
        ("gm_key" = [])
    ),
    responses(
        (status = 200, description = "审批通过", body = DecisionResult),
        (status = 409, description = "ALREADY_DECIDED", body = DecisionResult),
        (status = 500, description = "APPROVE_FAILED", body = DecisionResult)
    )
)]
pub async fn approve(
    service: web::Data<GmGrantService>,
    path: web::Path<i64>,
    body: web::Json<ApproveGrantRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    let result = service
        .approve(path.into_inner(), req.actor_id, req.memo)
        .await;
    Ok(HttpResponse::build(result.status()).json(result))
}

#[utoipa::path(
    post,
    path = "/gm/grants/{grant_id}/reject",
    tag = "gm",
    params(
        ("grant_id" = i64, Path, description = "发放记录 ID")
    ),
    request_body = RejectGrantRequest,
    security(
        ("gm_key" = [])
    ),
    responses(
        (status = 200, description = "已驳回", body = DecisionResult),
        (status = 409, description = "ALREADY_DECIDED", body = DecisionResult),
        (status = 500, description = "REJECT_FAILED", body = DecisionResult)
    )
)]
pub async fn reject(
    service: web::Data<GmGrantService>,
    path: web::Path<i64>,
    body: web::Json<RejectGrantRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    let result = service
        .reject(path.into_inner(), req.actor_id, req.reason, req.memo)
        .await;
    Ok(HttpResponse::build(result.status()).json(result))
}

#[utoipa::path(
    post,
    path = "/gm/bonus-tickets",
    tag = "gm",
    request_body = IssueBonusTicketsRequest,
    security(
        ("gm_key" = [])
    ),
    responses(
        (status = 200, description = "发放成功", body = IssueBonusTicketsResponse),
        (status = 400, description = "参数非法")
    )
)]
/// 给用户发放当日额外抽奖券（count 1..=50）
pub async fn issue_bonus_tickets(
    service: web::Data<BonusTicketService>,
    body: web::Json<IssueBonusTicketsRequest>,
) -> Result<HttpResponse> {
    match service.issue_today(&body.into_inner()).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn gm_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gm")
            .route("/grants/pending", web::get().to(list_pending))
            .route("/grants/{grant_id}/approve", web::post().to(approve))
            .route("/grants/{grant_id}/reject", web::post().to(reject))
            .route("/bonus-tickets", web::post().to(issue_bonus_tickets)),
    );
}
