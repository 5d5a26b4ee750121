//! Store implementations for patotas

pub mod memory_store;
pub mod sql_store;

pub use memory_store::MemoryPatotaStore;
pub use sql_store::PatotaSqlStore;
