use async_trait::async_trait;
use sea_orm::*;
use uuid::Uuid;

use crate::db::ContractStore;
use crate::error::{ContractError, ContractResult};
use crate::models::contracts::{self, ContractFilter, PartyRole, Status};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct SeaOrmContractStore {
    db: DatabaseConnection,
}

impl SeaOrmContractStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Every column marked `Set`, so an `update_many` writes the full record.
fn full_active_model(contract: &contracts::Model) -> contracts::ActiveModel {
    contracts::ActiveModel {
        id: Set(contract.id),
        owner_id: Set(contract.owner_id),
        client_id: Set(contract.client_id),
        status: Set(contract.status),
        title: Set(contract.title.clone()),
        content: Set(contract.content.clone()),
        terms: Set(contract.terms.clone()),
        deliverables: Set(contract.deliverables.clone()),
        amount: Set(contract.amount),
        currency: Set(contract.currency.clone()),
        timeline: Set(contract.timeline.clone()),
        signed_by: Set(contract.signed_by),
        signed_at: Set(contract.signed_at),
        version: Set(contract.version),
        created_at: Set(contract.created_at),
        updated_at: Set(contract.updated_at),
    }
}

#[async_trait]
impl ContractStore for SeaOrmContractStore {
    async fn get_by_id(&self, id: Uuid) -> ContractResult<Option<contracts::Model>> {
        Ok(contracts::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert(&self, contract: contracts::Model) -> ContractResult<contracts::Model> {
        let id = contract.id;
        full_active_model(&contract)
            .insert(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    ContractError::ConcurrencyConflict(id)
                }
                _ => ContractError::Database(e),
            })
    }

    async fn put(
        &self,
        contract: contracts::Model,
        expected_version: i64,
    ) -> ContractResult<contracts::Model> {
        let result = contracts::Entity::update_many()
            .set(full_active_model(&contract))
            .filter(contracts::Column::Id.eq(contract.id))
            .filter(contracts::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 1 {
            return Ok(contract);
        }

        // Zero rows: either the record is gone or its version moved.
        match self.get_by_id(contract.id).await? {
            Some(_) => Err(ContractError::ConcurrencyConflict(contract.id)),
            None => Err(ContractError::NotFound(contract.id)),
        }
    }

    async fn list_by_party(&self, filter: &ContractFilter) -> ContractResult<Vec<contracts::Model>> {
        let as_owner = Condition::all().add(contracts::Column::OwnerId.eq(filter.party_id));
        let as_client = Condition::all()
            .add(contracts::Column::ClientId.eq(filter.party_id))
            .add(contracts::Column::Status.ne(Status::Draft));

        let party = match filter.role {
            Some(PartyRole::Owner) => as_owner,
            Some(PartyRole::Client) => as_client,
            None => Condition::any().add(as_owner).add(as_client),
        };

        let mut query = contracts::Entity::find().filter(party);
        if let Some(status) = filter.status {
            query = query.filter(contracts::Column::Status.eq(status));
        }

        Ok(query
            .order_by_desc(contracts::Column::UpdatedAt)
            .order_by_desc(contracts::Column::Id)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.db)
            .await?)
    }
}
