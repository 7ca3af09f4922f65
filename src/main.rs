// main.rs
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web::JsonConfig;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

mod auth;
mod controllers;
mod db;
mod models;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting up...");

    let pool = match db::establish_connection().await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Gagal inisialisasi pool database: {:?}", e);
            std::process::exit(1);
        }
    };

    let frontend_origin =
        std::env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        let json_config = JsonConfig::default()
            .limit(1024 * 1024)
            .error_handler(|err, _req| {
                log::error!("JSON payload error: {}", err);
                actix_web::error::ErrorBadRequest(format!("Payload error: {}", err))
            });

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(json_config)
            .wrap(cors)
            .wrap(Logger::default())
            //auth
            .service(controllers::auth_controller::login)
            .service(controllers::auth_controller::logout)
            .service(controllers::auth_controller::get_current_user)
            //aspirasi
            .service(controllers::aspirasi_controller::get_aspirasi_list)
            .service(controllers::aspirasi_controller::get_aspirasi_detail)
            .service(controllers::aspirasi_controller::create_aspirasi)
            .service(controllers::aspirasi_controller::update_aspirasi_status)
            //kategori
            .service(controllers::kategori_controller::get_kategori)
            .service(controllers::kategori_controller::create_kategori)
            .service(controllers::kategori_controller::update_kategori)
            .service(controllers::kategori_controller::delete_kategori)
            //umpan balik
            .service(controllers::umpan_balik_controller::get_umpan_balik)
            .service(controllers::umpan_balik_controller::create_umpan_balik)
            //progres
            .service(controllers::progres_controller::get_progres)
            .service(controllers::progres_controller::create_progres)
            //users
            .service(controllers::user_controller::get_users)
            .service(controllers::user_controller::create_user)
            .service(controllers::user_controller::update_user)
            .service(controllers::user_controller::delete_user)
            //stats
            .service(controllers::stats_controller::get_stats)
    })
    .bind(bind_addr)?
    .run()
    .await
}
