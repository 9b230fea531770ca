//! `Authorization: Bearer` header helpers for outgoing requests and token-issuing responses.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Scheme prefix used by bearer credentials, including the separating space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Extracts a bearer token from a response's `Authorization` header.
///
/// The header must start with the exact `Bearer ` prefix and carry a non-blank token; anything
/// else is treated as absent.
pub fn extract_bearer(headers: &HeaderMap) -> Option<TokenSecret> {
	let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

	TokenSecret::new(raw.strip_prefix(BEARER_PREFIX)?)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn headers(value: &str) -> HeaderMap {
		let mut map = HeaderMap::new();

		map.insert(
			header::AUTHORIZATION,
			value.parse().expect("Header fixture should be a valid header value."),
		);

		map
	}

	#[test]
	fn well_formed_headers_yield_tokens() {
		let token = extract_bearer(&headers("Bearer jwt.payload.sig"))
			.expect("Well-formed bearer header should be extracted.");

		assert_eq!(token.expose(), "jwt.payload.sig");
	}

	#[test]
	fn malformed_headers_are_ignored() {
		assert!(extract_bearer(&HeaderMap::new()).is_none());
		assert!(extract_bearer(&headers("Basic dXNlcjpwYXNz")).is_none());
		assert!(extract_bearer(&headers("bearer lowercase-scheme")).is_none());
		assert!(extract_bearer(&headers("Bearer ")).is_none());
	}
}
