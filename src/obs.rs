//! Optional observability helpers for session calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `rest_session.call` with the `kind` (call
//!   family) and `stage` (call site) fields, plus debug events for retries, cancellations, and
//!   auth loss.
//! - Enable `metrics` to increment the `rest_session_call_total` counter for every
//!   attempt/success/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Call families observed by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Single REST request, including its retries.
	Request,
	/// Cursor pagination run.
	Pagination,
	/// Daily login-recording check.
	LoginCheck,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Pagination => "pagination",
			CallKind::LoginCheck => "login_check",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a session helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Transport failure that scheduled another attempt.
	Retry,
	/// Call aborted by `cancel_all`.
	Cancelled,
	/// Call rejected with 401/403, clearing the session.
	Unauthenticated,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Retry => "retry",
			CallOutcome::Cancelled => "cancelled",
			CallOutcome::Unauthenticated => "unauthenticated",
		}
	}

	/// Maps a call result onto its terminal outcome label.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => CallOutcome::Success,
			Err(e) if e.is_cancelled() => CallOutcome::Cancelled,
			Err(e) if e.is_unauthorized() => CallOutcome::Unauthenticated,
			Err(_) => CallOutcome::Failure,
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outcomes_follow_error_classes() {
		let cancelled: Result<()> = Err(Error::Cancelled { reason: "logout".into() });
		let rejected: Result<()> = Err(Error::from_status(401, b""));
		let missing: Result<()> = Err(Error::from_status(404, b""));

		assert_eq!(CallOutcome::of(&Ok(())), CallOutcome::Success);
		assert_eq!(CallOutcome::of(&cancelled), CallOutcome::Cancelled);
		assert_eq!(CallOutcome::of(&rejected), CallOutcome::Unauthenticated);
		assert_eq!(CallOutcome::of(&missing), CallOutcome::Failure);
		assert_eq!(CallKind::LoginCheck.to_string(), "login_check");
	}
}
