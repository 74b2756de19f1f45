use actix_web::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{GrantStatus, RewardType, SpinType, reward_entity, spin_entity};

use super::ApiError;

/// 抽奖请求体（字段缺失按空值处理，由校验统一拒绝）
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct SpinRequest {
    pub event_id: i64,
    pub user_id: i64,
    /// daily | bonus
    pub spin_type: String,
    /// 幂等键，同一个 request_id 只会产生一次抽奖
    pub request_id: String,
}

/// 已通过校验的抽奖指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinCommand {
    pub event_id: i64,
    pub user_id: i64,
    pub spin_type: SpinType,
    pub request_id: String,
}

impl SpinCommand {
    /// 在开启事务之前完成全部入参校验
    pub fn parse(
        event_id: i64,
        user_id: i64,
        spin_type: &str,
        request_id: &str,
    ) -> Result<Self, SpinErrorCode> {
        if event_id <= 0 || user_id <= 0 || request_id.is_empty() {
            return Err(SpinErrorCode::InvalidArgument);
        }
        let spin_type = SpinType::parse(spin_type).ok_or(SpinErrorCode::InvalidSpinType)?;
        Ok(Self {
            event_id,
            user_id,
            spin_type,
            request_id: request_id.to_string(),
        })
    }
}

impl TryFrom<&SpinRequest> for SpinCommand {
    type Error = SpinErrorCode;

    fn try_from(req: &SpinRequest) -> Result<Self, Self::Error> {
        SpinCommand::parse(req.event_id, req.user_id, &req.spin_type, &req.request_id)
    }
}

/// 抽奖接口错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinErrorCode {
    InvalidArgument,
    InvalidSpinType,
    NoBonusTicket,
    DailyLimitReached,
    SpinFailed,
}

impl SpinErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpinErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            SpinErrorCode::InvalidSpinType => "INVALID_SPIN_TYPE",
            SpinErrorCode::NoBonusTicket => "NO_BONUS_TICKET",
            SpinErrorCode::DailyLimitReached => "DAILY_LIMIT_REACHED",
            SpinErrorCode::SpinFailed => "SPIN_FAILED",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            SpinErrorCode::InvalidArgument => {
                "event_id, user_id, spin_type(daily|bonus), request_id are required"
            }
            SpinErrorCode::InvalidSpinType => "spin_type must be daily or bonus.",
            SpinErrorCode::NoBonusTicket => "No issued bonus ticket available.",
            SpinErrorCode::DailyLimitReached => "Daily spin already used today.",
            SpinErrorCode::SpinFailed => "Spin failed.",
        }
    }

    /// 调用方可见的 HTTP 状态
    pub fn status(&self) -> StatusCode {
        match self {
            SpinErrorCode::InvalidArgument | SpinErrorCode::InvalidSpinType => {
                StatusCode::BAD_REQUEST
            }
            SpinErrorCode::NoBonusTicket | SpinErrorCode::DailyLimitReached => {
                StatusCode::CONFLICT
            }
            SpinErrorCode::SpinFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for SpinErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 可预期的业务拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinRejection {
    NoBonusTicket,
    DailyLimitReached,
}

impl SpinRejection {
    pub fn code(&self) -> SpinErrorCode {
        match self {
            SpinRejection::NoBonusTicket => SpinErrorCode::NoBonusTicket,
            SpinRejection::DailyLimitReached => SpinErrorCode::DailyLimitReached,
        }
    }
}

/// 抽奖事务结果
#[derive(Debug, Clone, PartialEq)]
pub enum SpinOutcome {
    Completed(SpinData),
    Rejected(SpinRejection),
}

/// 抽奖流水 + 奖励快照
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SpinView {
    pub spin_idx: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub spin_type: SpinType,
    /// 抽奖日期 (YYYY-MM-DD)
    #[schema(value_type = String, example = "2025-10-01")]
    pub spin_date: NaiveDate,
    pub request_id: String,
    pub reward_id: String,
    /// 奖励配置被删除时为空
    pub reward_type: Option<RewardType>,
    pub reward_value: Option<i64>,
}

impl SpinView {
    pub fn new(spin: &spin_entity::Model, reward: Option<&reward_entity::Model>) -> Self {
        Self {
            spin_idx: spin.spin_idx,
            event_id: spin.event_id,
            user_id: spin.user_id,
            spin_type: spin.spin_type,
            spin_date: spin.spin_date,
            request_id: spin.request_id.clone(),
            reward_id: spin.reward_id.clone(),
            reward_type: reward.map(|r| r.reward_type),
            reward_value: reward.map(|r| r.reward_value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GrantRef {
    pub grant_idx: i64,
    pub status: GrantStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SpinData {
    /// true 表示本次为重放，未产生新的抽奖
    pub idempotent: bool,
    pub spin: SpinView,
    /// 仅新产生的抽奖携带
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant: Option<GrantRef>,
}

/// 抽奖接口响应: `{ ok, data?, error? }`
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SpinResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SpinData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    #[serde(skip)]
    pub code: Option<SpinErrorCode>,
}

impl SpinResult {
    pub fn success(data: SpinData) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn failure(code: SpinErrorCode, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(ApiError {
                code: code.as_str().to_string(),
                message: message.into(),
            }),
            code: Some(code),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code {
            None => StatusCode::OK,
            Some(code) => code.status(),
        }
    }
}

/// 活动奖励展示
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RewardResponse {
    pub reward_id: String,
    pub reward_type: RewardType,
    pub reward_value: i64,
    pub weight: i32,
}

impl From<reward_entity::Model> for RewardResponse {
    fn from(m: reward_entity::Model) -> Self {
        RewardResponse {
            reward_id: m.reward_id,
            reward_type: m.reward_type,
            reward_value: m.reward_value,
            weight: m.weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_bad_arguments() {
        assert_eq!(
            SpinCommand::parse(0, 7, "daily", "req-1"),
            Err(SpinErrorCode::InvalidArgument)
        );
        assert_eq!(
            SpinCommand::parse(1, -1, "daily", "req-1"),
            Err(SpinErrorCode::InvalidArgument)
        );
        assert_eq!(
            SpinCommand::parse(1, 7, "daily", ""),
            Err(SpinErrorCode::InvalidArgument)
        );
        assert_eq!(
            SpinCommand::parse(1, 7, "weekly", "req-1"),
            Err(SpinErrorCode::InvalidSpinType)
        );
    }

    #[test]
    fn test_parse_accepts_valid_command() {
        let cmd = SpinCommand::parse(1, 7, "bonus", "req-1").unwrap();
        assert_eq!(cmd.spin_type, SpinType::Bonus);
        assert_eq!(cmd.request_id, "req-1");
    }

    #[test]
    fn test_missing_fields_deserialize_to_invalid() {
        let req: SpinRequest = serde_json::from_str(r#"{"event_id": 1}"#).unwrap();
        assert_eq!(
            SpinCommand::try_from(&req),
            Err(SpinErrorCode::InvalidArgument)
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(SpinErrorCode::InvalidArgument.status(), StatusCode::BAD_REQUEST);
        assert_eq!(SpinErrorCode::InvalidSpinType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(SpinErrorCode::NoBonusTicket.status(), StatusCode::CONFLICT);
        assert_eq!(SpinErrorCode::DailyLimitReached.status(), StatusCode::CONFLICT);
        assert_eq!(
            SpinErrorCode::SpinFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_failure_envelope() {
        let result = SpinResult::failure(SpinErrorCode::DailyLimitReached, "used");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], "DAILY_LIMIT_REACHED");
        assert!(json.get("data").is_none());
        assert!(json.get("code").is_none());
    }
}
