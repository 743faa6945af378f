use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use taskgate::auth::{BcryptHasher, JwtService, TokenService};
use taskgate::clock::SystemClock;
use taskgate::config::Config;
use taskgate::db::Store;
use taskgate::routes;
use taskgate::usecases::{TaskUsecase, UserUsecase};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store = match Store::connect(
        &config.database_url,
        config.db_max_connections,
        config.db_timeout,
    )
    .await
    {
        Ok(store) => store,
        Err(e) => {
            error!("store unavailable: {}", e);
            std::process::exit(1);
        }
    };

    let tokens: Arc<dyn TokenService> = Arc::new(JwtService::new(&config.jwt_secret));
    let users = web::Data::new(UserUsecase::new(
        store.user_repository(),
        Arc::new(BcryptHasher::new(config.bcrypt_cost)),
        tokens.clone(),
    ));
    let tasks = web::Data::new(TaskUsecase::new(
        store.task_repository(),
        Arc::new(SystemClock),
    ));
    let store = web::Data::new(store);

    info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(users.clone())
            .app_data(tasks.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config(tokens.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
