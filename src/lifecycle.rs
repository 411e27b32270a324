//! Contract state machine.
//!
//! ```text
//! draft --send(owner)--> sent --sign(client)--> signed   [terminal]
//! draft --cancel(owner/client)--> cancelled              [terminal]
//! sent  --cancel(owner/client)--> cancelled              [terminal]
//! ```
//!
//! Every function here is pure: it takes the current record, the acting user
//! and the clock reading, and returns the next record or an error. The
//! service layer may call them several times for one request when an
//! optimistic write loses a race, so they must stay free of I/O.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::auth::authorization::{Action, authorize};
use crate::error::{ContractError, ContractResult};
use crate::models::contracts::{
    CreateContract, Deliverables, Model, SignContract, Status, UpdateContract,
};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Outcome of applying an action to a stored contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The record changed and must be written back.
    Applied(Model),
    /// The contract was already in the requested state (a replayed request).
    Unchanged(Model),
}

impl Transition {
    pub fn contract(&self) -> &Model {
        match self {
            Transition::Applied(m) | Transition::Unchanged(m) => m,
        }
    }

    pub fn into_contract(self) -> Model {
        match self {
            Transition::Applied(m) | Transition::Unchanged(m) => m,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }
}

/// Build a new draft owned by `owner_id`.
pub fn create(owner_id: Uuid, input: CreateContract, now: DateTime<Utc>) -> ContractResult<Model> {
    let title = input
        .title
        .ok_or_else(|| ContractError::Validation("title is required".to_string()))?;
    let client_id = input
        .client_id
        .ok_or_else(|| ContractError::Validation("client_id is required".to_string()))?;
    let amount = input
        .amount
        .ok_or_else(|| ContractError::Validation("amount is required".to_string()))?;

    let currency = match input.currency {
        Some(c) => normalize_currency(&c)?,
        None => DEFAULT_CURRENCY.to_string(),
    };

    Ok(Model {
        id: Uuid::new_v4(),
        owner_id,
        client_id: validate_client(owner_id, client_id)?,
        status: Status::Draft,
        title: validate_title(&title)?,
        content: input.content.unwrap_or_default(),
        terms: input.terms.unwrap_or_default(),
        deliverables: validate_deliverables(input.deliverables.unwrap_or_default())?,
        amount: validate_amount(amount)?,
        currency,
        timeline: input.timeline,
        signed_by: None,
        signed_at: None,
        version: 1,
        created_at: now,
        updated_at: now,
    })
}

/// Apply a content patch. Only the owner may edit, and only while drafting.
pub fn update(
    contract: &Model,
    actor_id: Uuid,
    patch: UpdateContract,
    now: DateTime<Utc>,
) -> ContractResult<Transition> {
    authorize(contract, actor_id, Action::Edit)?;
    require_status(contract, Status::Draft, Action::Edit)?;

    if patch.is_empty() {
        return Err(ContractError::Validation(
            "update must change at least one field".to_string(),
        ));
    }

    let mut next = contract.clone();
    if let Some(client_id) = patch.client_id {
        next.client_id = validate_client(contract.owner_id, client_id)?;
    }
    if let Some(title) = patch.title {
        next.title = validate_title(&title)?;
    }
    if let Some(content) = patch.content {
        next.content = content;
    }
    if let Some(terms) = patch.terms {
        next.terms = terms;
    }
    if let Some(deliverables) = patch.deliverables {
        next.deliverables = validate_deliverables(deliverables)?;
    }
    if let Some(amount) = patch.amount {
        next.amount = validate_amount(amount)?;
    }
    if let Some(currency) = patch.currency {
        next.currency = normalize_currency(&currency)?;
    }
    if let Some(timeline) = patch.timeline {
        next.timeline = Some(timeline);
    }

    Ok(Transition::Applied(stamp(next, contract, now)))
}

/// `draft → sent`. Freezes the content.
pub fn send(contract: &Model, actor_id: Uuid, now: DateTime<Utc>) -> ContractResult<Transition> {
    authorize(contract, actor_id, Action::Send)?;

    match contract.status {
        Status::Draft => {
            let mut next = contract.clone();
            next.status = Status::Sent;
            Ok(Transition::Applied(stamp(next, contract, now)))
        }
        Status::Sent => Ok(Transition::Unchanged(contract.clone())),
        status => Err(invalid(status, Action::Send)),
    }
}

/// `sent → signed`, recording who signed and when.
pub fn sign(
    contract: &Model,
    actor_id: Uuid,
    payload: SignContract,
    now: DateTime<Utc>,
) -> ContractResult<Transition> {
    authorize(contract, actor_id, Action::Sign)?;

    match contract.status {
        Status::Sent => {
            let signed_at = payload.signed_at.unwrap_or(now);
            if signed_at < contract.created_at {
                return Err(ContractError::Validation(
                    "signed_at cannot precede the contract's creation".to_string(),
                ));
            }

            let mut next = contract.clone();
            next.status = Status::Signed;
            next.signed_by = Some(actor_id);
            next.signed_at = Some(signed_at);
            Ok(Transition::Applied(stamp(next, contract, now)))
        }
        Status::Signed => Ok(Transition::Unchanged(contract.clone())),
        status => Err(invalid(status, Action::Sign)),
    }
}

/// `draft | sent → cancelled`. Either party may cancel.
pub fn cancel(contract: &Model, actor_id: Uuid, now: DateTime<Utc>) -> ContractResult<Transition> {
    authorize(contract, actor_id, Action::Cancel)?;

    match contract.status {
        Status::Draft | Status::Sent => {
            let mut next = contract.clone();
            next.status = Status::Cancelled;
            Ok(Transition::Applied(stamp(next, contract, now)))
        }
        Status::Cancelled => Ok(Transition::Unchanged(contract.clone())),
        Status::Signed => Err(invalid(Status::Signed, Action::Cancel)),
    }
}

/// Advance `updated_at` strictly past the previous value and bump `version`.
fn stamp(mut next: Model, previous: &Model, now: DateTime<Utc>) -> Model {
    next.updated_at = if now > previous.updated_at {
        now
    } else {
        previous.updated_at + Duration::microseconds(1)
    };
    next.version = previous.version + 1;
    next
}

fn require_status(contract: &Model, expected: Status, action: Action) -> ContractResult<()> {
    if contract.status == expected {
        Ok(())
    } else {
        Err(invalid(contract.status, action))
    }
}

fn invalid(status: Status, action: Action) -> ContractError {
    ContractError::InvalidState {
        status,
        action: action.verb(),
    }
}

fn validate_title(title: &str) -> ContractResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ContractError::Validation("title cannot be blank".to_string()));
    }
    Ok(title.to_string())
}

fn validate_client(owner_id: Uuid, client_id: Uuid) -> ContractResult<Uuid> {
    if client_id == owner_id {
        return Err(ContractError::Validation(
            "You cannot create a contract with yourself as the client".to_string(),
        ));
    }
    Ok(client_id)
}

fn validate_amount(amount: f64) -> ContractResult<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ContractError::Validation(
            "amount must be a positive number".to_string(),
        ));
    }
    Ok(amount)
}

fn normalize_currency(currency: &str) -> ContractResult<String> {
    let code = currency.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ContractError::Validation(format!(
            "currency must be a three-letter code, got {currency:?}"
        )));
    }
    Ok(code.to_ascii_uppercase())
}

fn validate_deliverables(items: Vec<String>) -> ContractResult<Deliverables> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let item = item.trim();
        if item.is_empty() {
            return Err(ContractError::Validation(format!(
                "deliverable #{} is blank",
                i + 1
            )));
        }
        out.push(item.to_string());
    }
    Ok(Deliverables(out))
}
