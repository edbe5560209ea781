//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_auth_api;
mod in_memory_key_value_store;
mod json_file_key_value_store;

pub use http_auth_api::HttpAuthApi;
pub use in_memory_key_value_store::InMemoryKeyValueStore;
pub use json_file_key_value_store::JsonFileKeyValueStore;
