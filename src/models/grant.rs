use actix_web::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{GrantSourceType, GrantStatus, grant_entity};

/// 待审批列表查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PendingGrantQuery {
    /// 只看某个活动的转盘发放记录
    pub event_id: Option<i64>,
    /// 每页数量，限定在 [1, 200]
    pub limit: Option<i64>,
    /// 偏移量，最小 0
    pub offset: Option<i64>,
}

/// 发放记录摘要
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GrantSummary {
    pub grant_idx: i64,
    pub user_id: i64,
    pub amount: i64,
    pub source_type: GrantSourceType,
    pub source_id: i64,
    pub request_id: String,
    pub status: GrantStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<grant_entity::Model> for GrantSummary {
    fn from(m: grant_entity::Model) -> Self {
        GrantSummary {
            grant_idx: m.grant_idx,
            user_id: m.user_id,
            amount: m.amount,
            source_type: m.source_type,
            source_id: m.source_id,
            request_id: m.request_id,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ApproveGrantRequest {
    pub actor_id: i64,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RejectGrantRequest {
    pub actor_id: i64,
    pub reason: Option<String>,
    pub memo: Option<String>,
}

/// 审批动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantAction {
    Approve,
    Reject,
}

impl GrantAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantAction::Approve => "approve",
            GrantAction::Reject => "reject",
        }
    }

    pub fn target_status(&self) -> GrantStatus {
        match self {
            GrantAction::Approve => GrantStatus::Approved,
            GrantAction::Reject => GrantStatus::Rejected,
        }
    }

    /// 非 ALREADY_DECIDED 的失败码
    pub fn failure_code(&self) -> &'static str {
        match self {
            GrantAction::Approve => "APPROVE_FAILED",
            GrantAction::Reject => "REJECT_FAILED",
        }
    }
}

/// 条件更新的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Decided(GrantStatus),
    AlreadyDecided,
}

pub const ALREADY_DECIDED: &str = "ALREADY_DECIDED";

/// 审批接口响应: `{ ok, code?, message? }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DecisionResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DecisionResult {
    pub fn decided() -> Self {
        Self {
            ok: true,
            code: None,
            message: None,
        }
    }

    pub fn already_decided() -> Self {
        Self {
            ok: false,
            code: Some(ALREADY_DECIDED.to_string()),
            message: None,
        }
    }

    pub fn failed(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code: Some(code.to_string()),
            message: Some(message.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_deref() {
            None => StatusCode::OK,
            Some(ALREADY_DECIDED) => StatusCode::CONFLICT,
            Some("INVALID_ARGUMENT") => StatusCode::BAD_REQUEST,
            Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 运营发放额外抽奖券
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct IssueBonusTicketsRequest {
    pub event_id: i64,
    pub user_id: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IssueBonusTicketsResponse {
    #[schema(value_type = String, example = "2025-10-01")]
    pub ticket_date: NaiveDate,
    pub ticket_idxs: Vec<i64>,
}
