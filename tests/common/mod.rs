#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use contract_lifecycle::ContractService;
use contract_lifecycle::config::LifecycleSettings;
use contract_lifecycle::db::ContractStore;
use contract_lifecycle::lifecycle;
use contract_lifecycle::models::contracts::{CreateContract, Model, SignContract, Status};
use uuid::Uuid;

/// A fixed clock reading so tests can reason about timestamps.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn draft_input(client_id: Uuid) -> CreateContract {
    CreateContract {
        client_id: Some(client_id),
        title: Some("Landing page redesign".to_string()),
        content: Some("Design and build a new landing page.".to_string()),
        terms: Some("50% upfront, 50% on delivery.".to_string()),
        deliverables: Some(vec!["Wireframes".to_string(), "Final build".to_string()]),
        amount: Some(5000.0),
        currency: Some("USD".to_string()),
        timeline: Some("4 weeks".to_string()),
    }
}

/// Drive a fresh contract into `status` through the engine.
pub fn contract_in(status: Status, owner: Uuid, client: Uuid) -> Model {
    let draft = lifecycle::create(owner, draft_input(client), t0()).unwrap();
    match status {
        Status::Draft => draft,
        Status::Sent => lifecycle::send(&draft, owner, t0()).unwrap().into_contract(),
        Status::Signed => {
            let sent = lifecycle::send(&draft, owner, t0()).unwrap().into_contract();
            lifecycle::sign(&sent, client, SignContract::default(), t0())
                .unwrap()
                .into_contract()
        }
        Status::Cancelled => lifecycle::cancel(&draft, owner, t0())
            .unwrap()
            .into_contract(),
    }
}

pub fn test_settings() -> LifecycleSettings {
    LifecycleSettings {
        max_conflict_retries: 3,
        request_timeout: Duration::from_secs(5),
        cache_ttl: Duration::from_secs(60),
    }
}

pub fn service_over<S: ContractStore + 'static>(store: Arc<S>) -> ContractService {
    ContractService::new(store, test_settings())
}
