use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ContractError;
use crate::models::contracts::{
    ContractFilter, ContractResponse, CreateContract, ListContractsQuery, SignContract,
    UpdateContract,
};
use crate::service::ContractService;

/// POST /api/contracts — a freelancer drafts a contract for a client.
///
/// The owner is the authenticated caller; `client_id`, `title` and `amount`
/// are required in the body.
pub async fn create_contract(
    user: AuthenticatedUser,
    service: web::Data<ContractService>,
    body: web::Json<CreateContract>,
) -> Result<HttpResponse, ContractError> {
    let contract = service.create(user.0.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ContractResponse::from(contract)))
}

/// GET /api/contracts — contracts the caller owns or has been sent.
///
/// Query params: `?role=owner|client&status=sent&limit=20&offset=0`.
/// Cancelled contracts are included unless filtered out by `status`.
pub async fn get_contracts(
    user: AuthenticatedUser,
    service: web::Data<ContractService>,
    query: web::Query<ListContractsQuery>,
) -> Result<HttpResponse, ContractError> {
    let filter = ContractFilter::for_party(user.0.id, &query);
    let contracts = service.list(filter).await?;

    let response: Vec<ContractResponse> =
        contracts.into_iter().map(ContractResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/contracts/{id} — only the owner or the client can view a contract.
pub async fn get_contract(
    user: AuthenticatedUser,
    service: web::Data<ContractService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ContractError> {
    let contract = service.get(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(ContractResponse::from(contract)))
}

/// PUT /api/contracts/{id} — the owner edits a draft.
pub async fn update_contract(
    user: AuthenticatedUser,
    service: web::Data<ContractService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContract>,
) -> Result<HttpResponse, ContractError> {
    let contract = service
        .update(path.into_inner(), user.0.id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ContractResponse::from(contract)))
}

/// POST /api/contracts/{id}/send — the owner sends a draft to the client.
pub async fn send_contract(
    user: AuthenticatedUser,
    service: web::Data<ContractService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ContractError> {
    let contract = service.send(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(ContractResponse::from(contract)))
}

/// POST /api/contracts/{id}/sign — the client signs a sent contract.
///
/// The body `{ "signed_at": ... }` is optional; the server time is used
/// when it is absent. A body that is present must parse.
pub async fn sign_contract(
    user: AuthenticatedUser,
    service: web::Data<ContractService>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<HttpResponse, ContractError> {
    let payload = parse_sign_body(&body)?;
    let contract = service.sign(path.into_inner(), user.0.id, payload).await?;
    Ok(HttpResponse::Ok().json(ContractResponse::from(contract)))
}

/// DELETE /api/contracts/{id} — either party cancels. Soft: the record stays.
pub async fn cancel_contract(
    user: AuthenticatedUser,
    service: web::Data<ContractService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ContractError> {
    let contract = service.cancel(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(ContractResponse::from(contract)))
}

fn parse_sign_body(body: &[u8]) -> Result<SignContract, ContractError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SignContract::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ContractError::Validation(format!("Invalid sign request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sign_body_means_server_time() {
        assert!(parse_sign_body(b"").unwrap().signed_at.is_none());
        assert!(parse_sign_body(b" \n").unwrap().signed_at.is_none());
        assert!(parse_sign_body(b"{}").unwrap().signed_at.is_none());
    }

    #[test]
    fn malformed_sign_body_is_rejected() {
        for body in [&b"{\"signed_at\":\"not-a-date\"}"[..], b"{", b"null"] {
            assert!(matches!(
                parse_sign_body(body),
                Err(ContractError::Validation(_))
            ));
        }
    }
}
