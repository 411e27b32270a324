use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use contract_lifecycle::auth::TokenVerifier;
use contract_lifecycle::cache::RedisCache;
use contract_lifecycle::config::AppConfig;
use contract_lifecycle::db::{self, ContractStore, InMemoryContractStore, SeaOrmContractStore};
use contract_lifecycle::handlers;
use contract_lifecycle::service::ContractService;
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let store: Arc<dyn ContractStore> = match &config.database_url {
        Some(url) => {
            let conn = db::connect(url).await.map_err(io::Error::other)?;
            if config.run_migrations {
                Migrator::up(&conn, None).await.map_err(io::Error::other)?;
                tracing::info!("Migrations applied");
            }
            tracing::info!("Connected to database");
            Arc::new(SeaOrmContractStore::new(conn))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, contracts are kept in memory");
            Arc::new(InMemoryContractStore::new())
        }
    };

    let mut service = ContractService::new(store, config.lifecycle.clone());
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::new(redis_url).await {
            Ok(cache) => {
                tracing::info!("Connected to Redis");
                service = service.with_cache(Arc::new(cache));
            }
            Err(e) => tracing::warn!("Redis unavailable, running without cache: {}", e),
        }
    }

    let service_data = web::Data::new(service);
    let verifier_data = web::Data::new(TokenVerifier::from_config(&config.auth));

    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(service_data.clone())
            .app_data(verifier_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
