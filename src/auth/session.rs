//! Point-in-time view of the locally stored session.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Authentication state derived from the presence of a stored token.
///
/// There is no server-side session modeled client-side: a stale token is only discovered when a
/// later call fails with 401/403, at which point the pipeline clears it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
	/// No usable token is stored.
	Unauthenticated,
	/// A non-blank token is stored.
	Authenticated,
}

/// Snapshot of the stored token and the last recorded login instant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
	/// Stored bearer token, if any.
	pub token: Option<TokenSecret>,
	/// Instant of the last recorded login, if any.
	pub last_login_at: Option<OffsetDateTime>,
}
impl Session {
	/// Returns the authentication state implied by the snapshot.
	pub fn state(&self) -> AuthState {
		if self.token.is_some() { AuthState::Authenticated } else { AuthState::Unauthenticated }
	}
}
