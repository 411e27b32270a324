use uuid::Uuid;

use crate::error::ContractError;
use crate::models::contracts::Model;

/// Something a user may try to do to a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
    Send,
    Sign,
    Cancel,
}

impl Action {
    pub fn verb(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Edit => "edit",
            Action::Send => "send",
            Action::Sign => "sign",
            Action::Cancel => "cancel",
        }
    }
}

/// The caller's relationship to one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The freelancer who drafted the contract.
    Owner(Uuid),
    /// The party the contract is addressed to.
    Client(Uuid),
    Stranger(Uuid),
}

impl Actor {
    pub fn resolve(contract: &Model, user_id: Uuid) -> Self {
        if contract.owner_id == user_id {
            Actor::Owner(user_id)
        } else if contract.client_id == user_id {
            Actor::Client(user_id)
        } else {
            Actor::Stranger(user_id)
        }
    }

    /// Role capabilities, independent of contract status.
    pub fn permits(self, action: Action) -> bool {
        match self {
            Actor::Owner(_) => matches!(
                action,
                Action::View | Action::Edit | Action::Send | Action::Cancel
            ),
            Actor::Client(_) => matches!(action, Action::View | Action::Sign | Action::Cancel),
            Actor::Stranger(_) => false,
        }
    }
}

/// Resolve the caller's role on `contract` and require it to allow `action`.
pub fn authorize(contract: &Model, user_id: Uuid, action: Action) -> Result<Actor, ContractError> {
    let actor = Actor::resolve(contract, user_id);
    if actor.permits(action) {
        return Ok(actor);
    }

    let reason = match action {
        Action::View => "You can only view contracts you are a party to",
        Action::Edit => "Only the contract owner can edit it",
        Action::Send => "Only the contract owner can send it",
        Action::Sign => "Only the contract's client can sign it",
        Action::Cancel => "Only the owner or the client can cancel a contract",
    };
    Err(ContractError::Forbidden(reason.to_string()))
}
