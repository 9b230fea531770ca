//! Authentication pipeline shared by every authenticated client.
//!
//! [`AuthPipeline`] owns the session store, the cancellation registry, and the
//! `on_unauthenticated` subscribers. The interceptor logic itself lives in two pure functions,
//! [`inject_authorization`] and [`classify_failure`]; the pipeline feeds them fresh state on every
//! call and applies the side effects they ask for.

mod subscription;

pub use subscription::Subscription;

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, extract_bearer},
	cancel::{CancellationGeneration, CancellationRegistry},
	error::ConfigError,
	http::{ApiRequest, ApiResponse},
	obs,
	pipeline::subscription::Listeners,
	store::SessionStore,
};

/// Side effect requested by [`classify_failure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureAction {
	/// Leave the session untouched.
	Ignore,
	/// Clear the stored token, then notify subscribers.
	ClearAndNotify,
}

/// Session state, cancellation, and auth-loss subscribers for one backend.
#[derive(Debug)]
pub struct AuthPipeline {
	session: SessionStore,
	cancellation: CancellationRegistry,
	listeners: Listeners,
}
impl AuthPipeline {
	/// Creates a pipeline over `session`.
	pub fn new(session: SessionStore) -> Self {
		Self {
			session,
			cancellation: CancellationRegistry::default(),
			listeners: Listeners::default(),
		}
	}

	/// Returns the session store.
	pub fn session(&self) -> &SessionStore {
		&self.session
	}

	/// Returns the cancellation registry.
	pub fn cancellation(&self) -> &CancellationRegistry {
		&self.cancellation
	}

	/// Returns the generation new requests capture.
	pub fn current_generation(&self) -> CancellationGeneration {
		self.cancellation.current()
	}

	/// Aborts every request dispatched so far and starts a new generation.
	pub fn cancel_all(&self, reason: Option<&str>) -> u64 {
		self.cancellation.cancel_all(reason)
	}

	/// Registers `callback` to run after a 401/403 clears the session.
	///
	/// The callback runs synchronously on the task that observed the failure, once per failure.
	pub fn on_unauthenticated<F>(&self, callback: F) -> Subscription
	where
		F: 'static + Fn() + Send + Sync,
	{
		self.listeners.subscribe(Arc::new(callback))
	}

	/// Request interceptor: injects the stored token and returns the generation to attach.
	pub fn on_request(&self, request: &mut ApiRequest) -> Result<CancellationGeneration> {
		self.authorize(request)?;

		Ok(self.current_generation())
	}

	/// Injects the token as currently stored; used for every attempt, retries included.
	pub fn authorize(&self, request: &mut ApiRequest) -> Result<()> {
		let token = self.session.token()?;

		inject_authorization(token.as_ref(), request)?;

		Ok(())
	}

	/// Response-error interceptor: applies the side effects `error` calls for.
	///
	/// The caller still returns `error`; this only observes it. A failure to clear the token is
	/// reported through tracing but does not stop subscribers from being notified.
	pub fn on_response_error(&self, error: &Error) -> FailureAction {
		let status = error.status();
		let action = classify_failure(status);

		if action == FailureAction::ClearAndNotify {
			if let Err(_e) = self.session.clear_token() {
				#[cfg(feature = "tracing")]
				tracing::error!(error = %_e, "failed to clear token after auth failure");
			}

			let notified = self.listeners.notify();

			obs::trace_auth_lost(status, notified);
		}

		action
	}

	/// Persists the bearer token carried by a token-issuing response.
	///
	/// Returns `Ok(false)` when the response has no well-formed `Authorization: Bearer` header;
	/// the stored token is left as is in that case.
	pub fn persist_bearer(&self, response: &ApiResponse) -> Result<bool> {
		let Some(token) = extract_bearer(&response.headers) else {
			return Ok(false);
		};

		self.session.store_token(token.expose())?;

		Ok(true)
	}

	/// Returns `true` when a non-blank token is stored.
	pub fn is_logged_in(&self) -> Result<bool> {
		Ok(self.session.is_logged_in()?)
	}

	/// Clears the stored token without notifying subscribers.
	pub fn logout(&self) -> Result<()> {
		Ok(self.session.clear_token()?)
	}
}

/// Sets `Authorization: Bearer <token>` when a token is available; leaves the request as is
/// otherwise.
pub fn inject_authorization(
	token: Option<&TokenSecret>,
	request: &mut ApiRequest,
) -> Result<(), ConfigError> {
	match token {
		Some(token) => request.set_bearer(token),
		None => Ok(()),
	}
}

/// Maps a response status (`0` when none was received) onto the session side effect.
pub fn classify_failure(status: u16) -> FailureAction {
	match status {
		401 | 403 => FailureAction::ClearAndNotify,
		_ => FailureAction::Ignore,
	}
}
