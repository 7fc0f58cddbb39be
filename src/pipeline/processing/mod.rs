pub mod enrich;
pub mod parser;
