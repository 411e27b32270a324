use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract status stored as a lowercase string in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "signed")]
    Signed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Status {
    /// `signed` and `cancelled` have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Signed | Status::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Sent => "sent",
            Status::Signed => "signed",
            Status::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered deliverables, persisted as a JSONB array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Deliverables(pub Vec<String>);

/// SeaORM entity for the `contracts` table.
///
/// `version` is the optimistic-concurrency token: every write bumps it and
/// conditional updates compare against it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub status: Status,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub terms: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub deliverables: Deliverables,
    #[sea_orm(column_type = "Double")]
    pub amount: f64,
    pub currency: String,
    pub timeline: Option<String>,
    pub signed_by: Option<Uuid>,
    pub signed_at: Option<DateTimeUtc>,
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn signature(&self) -> Option<Signature> {
        match (self.signed_by, self.signed_at) {
            (Some(signed_by), Some(signed_at)) => Some(Signature {
                signed_by,
                signed_at,
            }),
            _ => None,
        }
    }
}

// ── DTOs ──

/// Request body for `POST /api/contracts`.
///
/// Required fields are `Option` so that a missing one is reported as a
/// validation error rather than a JSON decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateContract {
    pub client_id: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub terms: Option<String>,
    pub deliverables: Option<Vec<String>>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub timeline: Option<String>,
}

/// Request body for `PUT /api/contracts/{id}`. Absent fields are left as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContract {
    pub client_id: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub terms: Option<String>,
    pub deliverables: Option<Vec<String>>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub timeline: Option<String>,
}

impl UpdateContract {
    pub fn is_empty(&self) -> bool {
        self.client_id.is_none()
            && self.title.is_none()
            && self.content.is_none()
            && self.terms.is_none()
            && self.deliverables.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.timeline.is_none()
    }
}

/// Request body for `POST /api/contracts/{id}/sign`. The whole body is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignContract {
    pub signed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub signed_by: Uuid,
    pub signed_at: DateTime<Utc>,
}

/// Which side of a contract a listing is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Owner,
    Client,
}

/// Query string for `GET /api/contracts`: `?role=client&status=sent&limit=20&offset=0`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListContractsQuery {
    pub role: Option<PartyRole>,
    pub status: Option<Status>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ListContractsQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// What a store listing is asked for.
///
/// `role = None` means "either side". Drafts are never listed on the client
/// side: a draft is only visible to its owner.
#[derive(Debug, Clone)]
pub struct ContractFilter {
    pub party_id: Uuid,
    pub role: Option<PartyRole>,
    pub status: Option<Status>,
    pub limit: u64,
    pub offset: u64,
}

impl ContractFilter {
    pub fn for_party(party_id: Uuid, query: &ListContractsQuery) -> Self {
        Self {
            party_id,
            role: query.role,
            status: query.status,
            limit: query.limit(),
            offset: query.offset(),
        }
    }

    /// In-process equivalent of the SQL predicate the database store builds.
    pub fn matches(&self, contract: &Model) -> bool {
        let as_owner = contract.owner_id == self.party_id;
        let as_client = contract.client_id == self.party_id && contract.status != Status::Draft;

        let party_ok = match self.role {
            Some(PartyRole::Owner) => as_owner,
            Some(PartyRole::Client) => as_client,
            None => as_owner || as_client,
        };

        party_ok && self.status.is_none_or(|s| s == contract.status)
    }
}

/// Contract representation for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub status: Status,
    pub title: String,
    pub content: String,
    pub terms: String,
    pub deliverables: Vec<String>,
    pub amount: f64,
    pub currency: String,
    pub timeline: Option<String>,
    pub signature: Option<Signature>,
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl From<Model> for ContractResponse {
    fn from(m: Model) -> Self {
        let signature = m.signature();
        Self {
            id: m.id,
            owner_id: m.owner_id,
            client_id: m.client_id,
            status: m.status,
            title: m.title,
            content: m.content,
            terms: m.terms,
            deliverables: m.deliverables.0,
            amount: m.amount,
            currency: m.currency,
            timeline: m.timeline,
            signature,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
