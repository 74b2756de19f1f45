use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// 基础设施故障与配置缺陷。
/// 可预期的业务拒绝（无抽奖券、每日次数已用、已审批）不走这里，
/// 由各服务以结果枚举返回。
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    /// 服务端未配置 GM key，GM 接口整体不可用
    #[error("GM_KEY_NOT_CONFIGURED")]
    GmKeyNotConfigured,

    #[error("Internal server error: {0}")]
    InternalError(String),

    /// 活动没有任何启用的奖励（配置缺陷）
    #[error("NO_ACTIVE_REWARDS")]
    NoActiveRewards,

    /// 启用奖励的权重之和 <= 0（配置缺陷）
    #[error("INVALID_REWARD_WEIGHTS")]
    InvalidRewardWeights,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ValidationError(_) => "INVALID_ARGUMENT",
            AppError::AuthError(_) => "UNAUTHORIZED",
            AppError::GmKeyNotConfigured => "GM_KEY_NOT_CONFIGURED",
            AppError::NoActiveRewards => "NO_ACTIVE_REWARDS",
            AppError::InvalidRewardWeights => "INVALID_REWARD_WEIGHTS",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            AppError::GmKeyNotConfigured => {
                log::error!("GM API key is not configured");
                "GM API key is not configured".to_string()
            }
            AppError::NoActiveRewards | AppError::InvalidRewardWeights => {
                log::error!("Reward catalog misconfigured: {self}");
                self.to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "ok": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }))
    }
}
