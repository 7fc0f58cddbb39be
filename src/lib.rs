pub mod config;
pub mod constants;
pub mod error;
pub mod server;
pub mod types;

// Layered boundaries: application ports/use cases and infrastructure adapters
pub mod app;
pub mod infra;

pub mod observability;
pub mod pipeline;

pub use app::enrich_use_case::{BatchOutcome, EnrichUseCase};
pub use error::{EnricherError, Result};
pub use types::{EnrichResponse, EnrichmentError, EntityReference, LookupFailure, Record};
