use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;
use subtle::ConstantTimeEq;

/// 运营后台鉴权头（小写，HeaderName::from_static 要求）
pub const GM_KEY_HEADER: &str = "x-gm-key";

/// 需要 GM key 的路径前缀
const GM_PREFIXES: &[&str] = &["/gm/"];

fn is_gm_path(path: &str) -> bool {
    GM_PREFIXES.iter().any(|&prefix| path.starts_with(prefix))
}

/// 常量时间比较，长度不同直接判为不等
fn key_matches(expected: &str, provided: &str) -> bool {
    bool::from(expected.as_bytes().ct_eq(provided.as_bytes()))
}

/// 校验 `/gm/*` 请求的 X-GM-KEY
pub struct GmKeyMiddleware {
    api_key: Rc<str>,
}

impl GmKeyMiddleware {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: Rc::from(api_key),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for GmKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = GmKeyMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GmKeyMiddlewareService {
            service,
            api_key: self.api_key.clone(),
        }))
    }
}

pub struct GmKeyMiddlewareService<S> {
    service: S,
    api_key: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for GmKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行 CORS 预检与非 GM 路径
        if req.method() == Method::OPTIONS || !is_gm_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.api_key.is_empty() {
            return Box::pin(async move { Err(AppError::GmKeyNotConfigured.into()) });
        }

        let provided = req
            .headers()
            .get(GM_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if key_matches(&self.api_key, provided) {
            let fut = self.service.call(req);
            Box::pin(fut)
        } else {
            log::warn!("Rejected GM request to {}: bad {GM_KEY_HEADER}", req.path());
            let error = AppError::AuthError("Invalid GM key".to_string());
            Box::pin(async move { Err(error.into()) })
        }
    }
}
