//! # keyward-database
//!
//! PostgreSQL connection management, migrations, and concrete repository
//! implementations for users, roles, claims, and session revocations.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
