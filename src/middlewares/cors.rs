use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        // 运营后台与活动页不同源，部署时由网关收紧
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::HeaderName::from_static(super::gm_auth::GM_KEY_HEADER),
        ])
        .max_age(3600)
}
