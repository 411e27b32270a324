pub mod contracts;
pub mod health;

use actix_web::web;

use crate::error::ContractError;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Extractor failures answer with the same error body as everything else.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ContractError::Validation(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ContractError::Validation(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ContractError::Validation(err.to_string()).into()
    }));

    cfg.route("/health", web::get().to(health::health_check));

    // ── Contract routes (all protected — require valid JWT) ──
    cfg.service(
        web::scope("/contracts")
            .route("", web::get().to(contracts::get_contracts))
            .route("", web::post().to(contracts::create_contract))
            .route("/{id}", web::get().to(contracts::get_contract))
            .route("/{id}", web::put().to(contracts::update_contract))
            .route("/{id}", web::delete().to(contracts::cancel_contract))
            .route("/{id}/send", web::post().to(contracts::send_contract))
            .route("/{id}/sign", web::post().to(contracts::sign_contract)),
    );
}
