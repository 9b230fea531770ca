//! Authentication endpoints built on the session pipeline.
//!
//! [`AuthService`] covers the token lifecycle end to end: token-issuing calls (login, federated
//! login, welcome links, password recovery) persist the bearer header they receive, the daily
//! login check keeps the backend's login history current, and the remaining calls read the
//! identity and accounts behind the stored token.

mod auth;
mod model;

pub use auth::*;
pub use model::*;
