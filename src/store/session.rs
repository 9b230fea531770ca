//! Namespaced session store holding the bearer token, login timestamp, and scratch values.
//!
//! [`SessionStore`] is the only owner of the authentication state. It keeps durable values (token,
//! last login instant) in one [`KeyValueStore`] and session-scoped values (temporary password) in
//! another that is expected to disappear with the process.

// std
use std::borrow::Cow;
// self
use crate::{
	_prelude::*,
	auth::{Session, TokenSecret},
	store::{KeyValueStore, MemoryStore, StoreError},
};

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Key holding the last recorded login instant as unix milliseconds.
pub const LOGIN_AT_KEY: &str = "login_at";
/// Key holding a temporary password issued during recovery.
pub const TEMP_PASSWORD_KEY: &str = "temp_password";

/// Token and timestamp storage shared by the pipeline and the auth service.
#[derive(Clone)]
pub struct SessionStore {
	durable: Arc<dyn KeyValueStore>,
	scratch: Arc<dyn KeyValueStore>,
	namespace: Option<String>,
}
impl SessionStore {
	/// Creates a store over `durable`, with an in-memory scratch store.
	pub fn new(durable: Arc<dyn KeyValueStore>) -> Self {
		Self { durable, scratch: Arc::new(MemoryStore::default()), namespace: None }
	}

	/// Creates a store whose durable and scratch values both live in memory.
	pub fn in_memory() -> Self {
		Self::new(Arc::new(MemoryStore::default()))
	}

	/// Replaces the session-scoped backend.
	pub fn with_scratch(mut self, scratch: Arc<dyn KeyValueStore>) -> Self {
		self.scratch = scratch;

		self
	}

	/// Prefixes every key with `{namespace}_` so several apps can share one backend.
	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		let namespace = namespace.into();

		self.namespace = if namespace.is_empty() { None } else { Some(namespace) };

		self
	}

	/// Returns the stored bearer token, treating blank values as absent.
	pub fn token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.durable.get(&self.key(TOKEN_KEY))?.and_then(TokenSecret::new))
	}

	/// Stores a bearer token; a blank token clears the stored one instead.
	pub fn store_token(&self, token: impl Into<String>) -> Result<(), StoreError> {
		match TokenSecret::new(token) {
			Some(secret) => self.durable.set(&self.key(TOKEN_KEY), secret.expose()),
			None => self.clear_token(),
		}
	}

	/// Removes the stored bearer token.
	pub fn clear_token(&self) -> Result<(), StoreError> {
		self.durable.remove(&self.key(TOKEN_KEY))
	}

	/// Returns `true` when a non-blank token is stored.
	pub fn is_logged_in(&self) -> Result<bool, StoreError> {
		Ok(self.token()?.is_some())
	}

	/// Returns the last recorded login instant.
	///
	/// Values that cannot be parsed as unix milliseconds are treated as absent.
	pub fn last_login_at(&self) -> Result<Option<OffsetDateTime>, StoreError> {
		let Some(raw) = self.durable.get(&self.key(LOGIN_AT_KEY))? else {
			return Ok(None);
		};
		let instant = raw
			.trim()
			.parse::<i128>()
			.ok()
			.and_then(|millis| {
				OffsetDateTime::from_unix_timestamp_nanos(millis.checked_mul(1_000_000)?).ok()
			});

		Ok(instant)
	}

	/// Records `instant` as the last login.
	pub fn record_login_at(&self, instant: OffsetDateTime) -> Result<(), StoreError> {
		let millis = instant.unix_timestamp_nanos() / 1_000_000;

		self.durable.set(&self.key(LOGIN_AT_KEY), &millis.to_string())
	}

	/// Returns the temporary password held for this session.
	pub fn temporary_password(&self) -> Result<Option<String>, StoreError> {
		Ok(self.scratch.get(&self.key(TEMP_PASSWORD_KEY))?.filter(|value| !value.is_empty()))
	}

	/// Holds a temporary password for the rest of the session; an empty value clears it.
	pub fn store_temporary_password(&self, password: &str) -> Result<(), StoreError> {
		if password.is_empty() {
			self.clear_temporary_password()
		} else {
			self.scratch.set(&self.key(TEMP_PASSWORD_KEY), password)
		}
	}

	/// Forgets the temporary password.
	pub fn clear_temporary_password(&self) -> Result<(), StoreError> {
		self.scratch.remove(&self.key(TEMP_PASSWORD_KEY))
	}

	/// Reads the token and login instant in one snapshot.
	pub fn snapshot(&self) -> Result<Session, StoreError> {
		Ok(Session { token: self.token()?, last_login_at: self.last_login_at()? })
	}

	fn key<'a>(&self, key: &'a str) -> Cow<'a, str> {
		match &self.namespace {
			Some(namespace) => Cow::Owned(format!("{namespace}_{key}")),
			None => Cow::Borrowed(key),
		}
	}
}
impl Debug for SessionStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionStore").field("namespace", &self.namespace).finish()
	}
}
