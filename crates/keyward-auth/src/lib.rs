//! # keyward-auth
//!
//! Cookie-session authentication and claims-based authorization.
//!
//! ## Modules
//!
//! - `store`: credential persistence with atomic failed-attempt bookkeeping
//! - `password`: Argon2id hashing and password policy enforcement
//! - `lockout`: failed-attempt lockout state machine
//! - `token`: signed session tokens, validation, and the revocation denylist
//! - `revocation`: durable storage for revoked sessions
//! - `principal`: role and claim persistence plus the cached principal resolver
//! - `policy`: named role/claim policies and their evaluation
//! - `notify`: fire-and-forget email notices
//! - `cookie`: session cookie formatting and extraction
//! - `service`: the `AuthService` tying the components together

pub mod cookie;
pub mod error;
pub mod lockout;
pub mod notify;
pub mod password;
pub mod policy;
pub mod principal;
pub mod revocation;
pub mod service;
pub mod store;
pub mod token;

pub use cookie::SessionCookie;
pub use error::AuthError;
pub use lockout::{LockoutPolicy, LockoutState};
pub use notify::{EmailDispatcher, EmailMessage, EmailSender};
pub use password::{PasswordHasher, PasswordValidator};
pub use policy::{Decision, DenyReason, PolicyEvaluator, PolicyRegistry};
pub use principal::{PrincipalResolver, RoleClaimStore};
pub use revocation::RevocationStore;
pub use service::{AuthService, NewAccount, SignIn};
pub use store::CredentialStore;
pub use token::{SessionClaims, SessionDenylist, SessionTokenIssuer, SessionTokenValidator};
