// Enrichment pipeline: CSV parsing and per-record enrichment rules

pub mod processing;

pub use processing::enrich;
pub use processing::parser;
