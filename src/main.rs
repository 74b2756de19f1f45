use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;

use roulette_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{GmKeyMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
};

/// 每行一个 JSON 对象: timestamp / level / message / target
fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let message = serde_json::to_string(&record.args().to_string())
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                message,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logger();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    if config.gm.api_key.is_empty() {
        log::warn!("GM API key is empty, /gm routes will answer GM_KEY_NOT_CONFIGURED");
    }

    let spin_service = RouletteSpinService::new(pool.clone());
    let grant_service = GmGrantService::new(pool.clone(), config.roulette.default_page_limit);
    let ticket_service = BonusTicketService::new(pool.clone());
    let gm_key = config.gm.api_key.clone();

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(GmKeyMiddleware::new(&gm_key))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(handlers::json_config())
            .app_data(web::Data::new(spin_service.clone()))
            .app_data(web::Data::new(grant_service.clone()))
            .app_data(web::Data::new(ticket_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .configure(handlers::roulette_config)
            .configure(handlers::gm_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
