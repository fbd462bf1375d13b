//! Durable storage for revoked sessions.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryRevocationStore;
pub use postgres::PgRevocationStore;
pub use store::RevocationStore;
