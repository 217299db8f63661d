//! In-memory backends and helpers for tests. Enabled with the `test_utils` feature.
mod memory_store;
pub mod prepare_env;
mod test_gateway;

pub use memory_store::MemoryStore;
pub use test_gateway::TestGateway;
