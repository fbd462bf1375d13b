//! Signed session tokens.
//!
//! A session token is an HS256 JWT carrying the user id, a session id, and
//! issue/expiry instants. Validation checks the signature first, then expiry
//! against the injected clock, then the revocation denylist.

pub mod claims;
pub mod denylist;
pub mod issuer;
pub mod validator;

pub use claims::SessionClaims;
pub use denylist::SessionDenylist;
pub use issuer::{IssuedSession, SessionTokenIssuer};
pub use validator::SessionTokenValidator;
