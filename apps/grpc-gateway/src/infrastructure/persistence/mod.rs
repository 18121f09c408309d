//! Development Adapters
//!
//! In-memory implementations of every application port, used by the binary
//! and the integration tests. Nothing here survives a restart.

mod in_memory;

pub use in_memory::InMemoryBackend;
