pub mod gm;
pub mod health;
pub mod roulette;

pub use gm::gm_config;
pub use health::health_config;
pub use roulette::roulette_config;

use crate::error::AppError;
use actix_web::{HttpRequest, error::JsonPayloadError, web};

/// 请求体解析失败统一按 INVALID_ARGUMENT 返回
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        AppError::ValidationError(err.to_string()).into()
    })
}
