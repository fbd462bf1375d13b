//! Role and claim persistence plus principal resolution.

pub mod memory;
pub mod postgres;
pub mod resolver;
pub mod store;

pub use memory::MemoryRoleClaimStore;
pub use postgres::PgRoleClaimStore;
pub use resolver::PrincipalResolver;
pub use store::RoleClaimStore;
