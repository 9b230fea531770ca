//! Bearer token wrapper that redacts sensitive material.

// self
use crate::{_prelude::*, auth::BEARER_PREFIX};

/// Redacted bearer token keeping credentials out of logs and debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a token string, returning `None` when it is blank.
	pub fn new(value: impl Into<String>) -> Option<Self> {
		let value = value.into();

		if is_blank(&value) { None } else { Some(Self(value)) }
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Formats the `Authorization` header value for this token.
	pub fn authorization_value(&self) -> String {
		format!("{BEARER_PREFIX}{}", self.0)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Returns `true` for empty or whitespace-only values.
pub fn is_blank(value: &str) -> bool {
	value.trim().is_empty()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret").expect("Non-blank token should wrap.");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.authorization_value(), "Bearer super-secret");
	}

	#[test]
	fn blank_tokens_are_rejected() {
		assert!(TokenSecret::new("").is_none());
		assert!(TokenSecret::new("  \t").is_none());
		assert!(is_blank("\n"));
		assert!(!is_blank(" x "));
	}
}
