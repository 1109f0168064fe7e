//! Adapters behind the domain ports, plus the advisor rate limiter.

pub mod command_advisor;
pub mod in_memory;
pub mod rate_limiter;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
