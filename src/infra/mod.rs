pub mod http_client;
pub mod registry_adapter;
