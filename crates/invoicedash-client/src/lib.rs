pub mod aggregate;
pub mod chat;
pub mod commands;
pub mod config;
pub mod contracts;
pub mod error;
pub mod export;
pub mod extract;
pub mod ingest;
pub mod migrations;
pub mod resolve;
pub mod setup;
pub mod state;

pub use contracts::envelope::{ContractKind, FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
