//! Column and key names shared by the parser, the enricher and the JSON output.

// Recognized input columns
pub const LEI_COLUMN: &str = "lei";
pub const NOTIONAL_COLUMN: &str = "notional";
pub const RATE_COLUMN: &str = "rate";

// Enrichment output keys
pub const LEGAL_NAME_KEY: &str = "legal_name";
pub const BIC_KEY: &str = "bic";
pub const TRANSACTIONS_COSTS_KEY: &str = "transactions_costs";

// Surplus fields of rows wider than the header
pub const OVERFLOW_KEY: &str = "_overflow";

// Legal-address country codes with a cost rule
pub const COUNTRY_GB: &str = "GB";
pub const COUNTRY_NL: &str = "NL";

pub const DEFAULT_REGISTRY_URL: &str = "https://api.gleif.org/api/v1/lei-records";
pub const LEI_FILTER_PARAM: &str = "filter[lei]";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_CONFIG_FILE: &str = "enricher.toml";

/// Message returned when every record was enriched without error
pub const OK_MESSAGE: &str = "OK";
pub const PARTIAL_FAILURE_PREFIX: &str = "Some entries could not be enriched";
