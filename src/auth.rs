//! Session-domain models: redacted bearer secrets, header helpers, and the auth state snapshot.

pub mod bearer;
pub mod secret;
pub mod session;

pub use bearer::*;
pub use secret::*;
pub use session::*;
