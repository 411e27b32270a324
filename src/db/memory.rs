use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::ContractStore;
use crate::error::{ContractError, ContractResult};
use crate::models::contracts::{ContractFilter, Model};

/// Process-local store for tests and database-less runs.
///
/// The write lock makes the version check and the overwrite one atomic step,
/// matching the conditional `UPDATE` of the database store.
#[derive(Default)]
pub struct InMemoryContractStore {
    contracts: RwLock<HashMap<Uuid, Model>>,
}

impl InMemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractStore for InMemoryContractStore {
    async fn get_by_id(&self, id: Uuid) -> ContractResult<Option<Model>> {
        Ok(self.contracts.read().await.get(&id).cloned())
    }

    async fn insert(&self, contract: Model) -> ContractResult<Model> {
        let mut contracts = self.contracts.write().await;
        if contracts.contains_key(&contract.id) {
            return Err(ContractError::ConcurrencyConflict(contract.id));
        }
        contracts.insert(contract.id, contract.clone());
        Ok(contract)
    }

    async fn put(&self, contract: Model, expected_version: i64) -> ContractResult<Model> {
        let mut contracts = self.contracts.write().await;
        let stored = contracts
            .get_mut(&contract.id)
            .ok_or(ContractError::NotFound(contract.id))?;

        if stored.version != expected_version {
            return Err(ContractError::ConcurrencyConflict(contract.id));
        }
        *stored = contract.clone();
        Ok(contract)
    }

    async fn list_by_party(&self, filter: &ContractFilter) -> ContractResult<Vec<Model>> {
        let contracts = self.contracts.read().await;
        let mut matching: Vec<Model> = contracts
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }
}
