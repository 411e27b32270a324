use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::authorization::{Action, Actor, authorize};
use crate::cache::ContractCache;
use crate::config::LifecycleSettings;
use crate::db::ContractStore;
use crate::error::{ContractError, ContractResult};
use crate::lifecycle::{self, Transition};
use crate::models::contracts::{
    ContractFilter, CreateContract, Model, SignContract, Status, UpdateContract,
};

/// Runs lifecycle operations against a store.
///
/// Every mutation is a read-validate-write cycle: load the record, hand it to
/// the pure engine in [`lifecycle`], then write back conditionally on the
/// version that was read. A lost race is retried only while the contract's
/// status is unchanged. Once another request has moved the status, the
/// request is either a replay of that move, answered with the stored record,
/// or a conflict that goes back to the caller.
///
/// The cached copy is evicted before every write and refreshed only after the
/// deadline has resolved.
#[derive(Clone)]
pub struct ContractService {
    store: Arc<dyn ContractStore>,
    cache: Option<Arc<dyn ContractCache>>,
    settings: LifecycleSettings,
}

impl ContractService {
    pub fn new(store: Arc<dyn ContractStore>, settings: LifecycleSettings) -> Self {
        Self {
            store,
            cache: None,
            settings,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ContractCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn create(&self, owner_id: Uuid, input: CreateContract) -> ContractResult<Model> {
        let contract = self
            .with_deadline(async {
                let contract = lifecycle::create(owner_id, input, now())?;
                self.store.insert(contract).await
            })
            .await?;

        info!(
            contract_id = %contract.id,
            owner_id = %owner_id,
            client_id = %contract.client_id,
            "Contract drafted"
        );
        self.remember(&contract).await;
        Ok(contract)
    }

    /// Fetch one contract on behalf of `viewer_id`.
    ///
    /// Strangers are refused; a client does not see the contract until it
    /// has been sent.
    pub async fn get(&self, id: Uuid, viewer_id: Uuid) -> ContractResult<Model> {
        self.with_deadline(async {
            let contract = self.load(id).await?;
            let actor = authorize(&contract, viewer_id, Action::View)?;

            if matches!(actor, Actor::Client(_)) && contract.status == Status::Draft {
                return Err(ContractError::NotFound(id));
            }
            Ok(contract)
        })
        .await
    }

    pub async fn list(&self, filter: ContractFilter) -> ContractResult<Vec<Model>> {
        self.with_deadline(self.store.list_by_party(&filter)).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        actor_id: Uuid,
        patch: UpdateContract,
    ) -> ContractResult<Model> {
        self.mutate(id, actor_id, "update", move |c, now| {
            lifecycle::update(c, actor_id, patch.clone(), now)
        })
        .await
    }

    pub async fn send(&self, id: Uuid, actor_id: Uuid) -> ContractResult<Model> {
        self.mutate(id, actor_id, "send", move |c, now| {
            lifecycle::send(c, actor_id, now)
        })
        .await
    }

    pub async fn sign(
        &self,
        id: Uuid,
        actor_id: Uuid,
        payload: SignContract,
    ) -> ContractResult<Model> {
        self.mutate(id, actor_id, "sign", move |c, now| {
            lifecycle::sign(c, actor_id, payload.clone(), now)
        })
        .await
    }

    pub async fn cancel(&self, id: Uuid, actor_id: Uuid) -> ContractResult<Model> {
        self.mutate(id, actor_id, "cancel", move |c, now| {
            lifecycle::cancel(c, actor_id, now)
        })
        .await
    }

    async fn mutate<F>(
        &self,
        id: Uuid,
        actor_id: Uuid,
        action: &'static str,
        apply: F,
    ) -> ContractResult<Model>
    where
        F: Fn(&Model, DateTime<Utc>) -> ContractResult<Transition>,
    {
        match self
            .with_deadline(self.read_validate_write(id, actor_id, action, apply))
            .await
        {
            Ok(contract) => {
                self.remember(&contract).await;
                Ok(contract)
            }
            Err(ContractError::Timeout) => {
                // The write may have landed after the eviction.
                self.forget(id).await;
                Err(ContractError::Timeout)
            }
            Err(e) => Err(e),
        }
    }

    async fn read_validate_write<F>(
        &self,
        id: Uuid,
        actor_id: Uuid,
        action: &'static str,
        apply: F,
    ) -> ContractResult<Model>
    where
        F: Fn(&Model, DateTime<Utc>) -> ContractResult<Transition>,
    {
        let mut current = self.fetch(id).await?;
        let mut retries = 0;

        loop {
            let next = match apply(&current, now())? {
                Transition::Unchanged(contract) => {
                    debug!(
                        contract_id = %id,
                        actor_id = %actor_id,
                        action,
                        "Replayed request, no change"
                    );
                    return Ok(contract);
                }
                Transition::Applied(next) => next,
            };

            self.forget(id).await;
            match self.store.put(next, current.version).await {
                Ok(saved) => {
                    info!(
                        contract_id = %id,
                        actor_id = %actor_id,
                        action,
                        from = %current.status,
                        to = %saved.status,
                        version = saved.version,
                        "Contract updated"
                    );
                    return Ok(saved);
                }
                Err(ContractError::ConcurrencyConflict(_)) => {
                    let latest = self.fetch(id).await?;

                    if latest.status != current.status {
                        if let Ok(Transition::Unchanged(contract)) = apply(&latest, now()) {
                            debug!(
                                contract_id = %id,
                                actor_id = %actor_id,
                                action,
                                "Concurrent duplicate already applied"
                            );
                            return Ok(contract);
                        }
                        warn!(
                            contract_id = %id,
                            action,
                            now_status = %latest.status,
                            "Lost a race to another transition"
                        );
                        return Err(ContractError::ConcurrencyConflict(id));
                    }
                    if retries >= self.settings.max_conflict_retries {
                        warn!(
                            contract_id = %id,
                            action,
                            retries,
                            "Giving up after repeated conflicts"
                        );
                        return Err(ContractError::ConcurrencyConflict(id));
                    }

                    retries += 1;
                    warn!(
                        contract_id = %id,
                        action,
                        attempt = retries,
                        "Write conflict, retrying"
                    );
                    current = latest;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch(&self, id: Uuid) -> ContractResult<Model> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(ContractError::NotFound(id))
    }

    /// Read through the cache. Mutations always use [`Self::fetch`].
    async fn load(&self, id: Uuid) -> ContractResult<Model> {
        if let Some(cache) = &self.cache {
            match cache.get(id).await {
                Ok(Some(contract)) => return Ok(contract),
                Ok(None) => {}
                Err(e) => warn!("Cache error: {}", e),
            }
        }

        let contract = self.fetch(id).await?;
        self.remember(&contract).await;
        Ok(contract)
    }

    async fn remember(&self, contract: &Model) {
        let Some(cache) = &self.cache else {
            return;
        };

        match cache.store(contract, self.settings.cache_ttl).await {
            Ok(true) => {}
            Ok(false) => debug!(
                contract_id = %contract.id,
                version = contract.version,
                "Cache already holds a newer copy"
            ),
            Err(e) => {
                warn!("Cache error: {}", e);
                self.forget(contract.id).await;
            }
        }
    }

    async fn forget(&self, id: Uuid) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.evict(id).await {
            warn!("Cache error: {}", e);
        }
    }

    async fn with_deadline<T, Fut>(&self, fut: Fut) -> ContractResult<T>
    where
        Fut: Future<Output = ContractResult<T>>,
    {
        match tokio::time::timeout(self.settings.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.settings.request_timeout, "Contract operation timed out");
                Err(ContractError::Timeout)
            }
        }
    }
}

/// Microsecond precision, matching what PostgreSQL stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
