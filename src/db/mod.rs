pub mod contracts;
pub mod memory;

use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection, DbErr};
use uuid::Uuid;

use crate::error::ContractResult;
use crate::models::contracts::{ContractFilter, Model};

pub use contracts::SeaOrmContractStore;
pub use memory::InMemoryContractStore;

/// Persistence boundary for contract records.
///
/// Writes are single-record and atomic. `put` is a compare-and-swap on
/// `version`: it fails with `ConcurrencyConflict` when the stored record has
/// moved on since it was read, and the caller re-runs its read-validate-write
/// cycle.
#[async_trait]
pub trait ContractStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> ContractResult<Option<Model>>;

    /// Store a brand-new record.
    async fn insert(&self, contract: Model) -> ContractResult<Model>;

    /// Overwrite the whole record if the stored version is still `expected_version`.
    async fn put(&self, contract: Model, expected_version: i64) -> ContractResult<Model>;

    /// Contracts the party takes part in, newest `updated_at` first.
    async fn list_by_party(&self, filter: &ContractFilter) -> ContractResult<Vec<Model>>;
}

/// Open a SeaORM connection pool.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
