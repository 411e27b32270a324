pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod service;

pub use error::{ContractError, ContractResult};
pub use service::ContractService;
