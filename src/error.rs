//! Session-level error types shared across the pipeline, transports, stores, and pagination.

// self
use crate::{_prelude::*, client::ClientConfigError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 512;

/// Canonical error exposed by public APIs.
///
/// Every failure is surfaced to the caller; the pipeline only observes errors to trigger side
/// effects (token clear, subscriber notification) and never converts them into success.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// No usable response was received (DNS, TCP, TLS, timeout, truncated body); retried per
	/// policy before surfacing.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the requested type.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Backend rejected the credentials (HTTP 401 or 403).
	#[error("Request was rejected as unauthorized with HTTP {status}.")]
	Unauthorized {
		/// HTTP status code (401 or 403).
		status: u16,
		/// Truncated response body for diagnostics.
		body: String,
	},
	/// Backend answered with any other non-success status.
	#[error("Request failed with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body for diagnostics.
		body: String,
	},
	/// Request was cancelled through the cancellation registry.
	#[error("Request was cancelled: {reason}.")]
	Cancelled {
		/// Reason passed to `cancel_all`.
		reason: String,
	},
}
impl Error {
	/// Classifies a non-success response into [`Error::Unauthorized`] or [`Error::Status`].
	pub fn from_status(status: u16, body: &[u8]) -> Self {
		let body = body_preview(body);

		match status {
			401 | 403 => Self::Unauthorized { status, body },
			_ => Self::Status { status, body },
		}
	}

	/// Returns the HTTP status carried by the error, or `0` when no response was received.
	pub fn status(&self) -> u16 {
		match self {
			Self::Unauthorized { status, .. } | Self::Status { status, .. } => *status,
			_ => 0,
		}
	}

	/// Returns `true` for cancellations triggered by `cancel_all`.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled { .. })
	}

	/// Returns `true` for 401/403 rejections.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized { .. })
	}
}

/// Configuration and request construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Client configuration failed validation.
	#[error(transparent)]
	Client(#[from] ClientConfigError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request path could not be resolved against the base URL.
	#[error("Request path `{path}` is invalid.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	RequestBody {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Stored token cannot be used as a header value.
	#[error("Stored token is not a valid header value.")]
	InvalidHeader {
		/// Underlying header validation failure.
		#[source]
		source: header::InvalidHeaderValue,
	},
	/// Page size must be positive.
	#[error("Page limit must be greater than zero.")]
	InvalidPageLimit,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
impl From<ClientConfigError> for Error {
	fn from(e: ClientConfigError) -> Self {
		Self::Config(e.into())
	}
}

/// Transport-level failures where no usable response was received.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred before a response was received.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured timeout.
	#[error("Request timed out before a response was received.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Response arrived but could not be read to completion.
	#[error("Response was received but could not be read.")]
	Response {
		/// Transport-specific read failure.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a failure that happened after the response started arriving.
	pub fn response(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Response { source: Box::new(src) }
	}

	/// Returns `true` when the failure was caused by the request timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}

	/// Returns `true` when the request failed before the server answered.
	pub fn is_network(&self) -> bool {
		matches!(self, Self::Network { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			Self::timeout(e)
		} else if e.is_connect() || e.is_request() {
			Self::network(e)
		} else {
			Self::response(e)
		}
	}
}

/// Response decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body was not valid JSON for the requested type.
	#[error("Response body could not be decoded at `{}`.", .source.path())]
	Json {
		/// Path-aware decoding failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Body decoded to an unexpected JSON shape.
	#[error("Response body must be a JSON {expected}.")]
	UnexpectedShape {
		/// Expected JSON shape.
		expected: &'static str,
	},
}

fn body_preview(body: &[u8]) -> String {
	let end = body.len().min(BODY_PREVIEW_LIMIT);

	String::from_utf8_lossy(&body[..end]).into_owned()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn statuses_classify_auth_failures() {
		let unauthorized = Error::from_status(401, b"{\"error\":\"expired\"}");
		let forbidden = Error::from_status(403, b"");
		let missing = Error::from_status(404, b"not found");

		assert!(unauthorized.is_unauthorized());
		assert!(forbidden.is_unauthorized());
		assert!(!missing.is_unauthorized());
		assert_eq!(unauthorized.status(), 401);
		assert_eq!(missing.status(), 404);
		assert!(matches!(missing, Error::Status { ref body, .. } if body == "not found"));
	}

	#[test]
	fn errors_without_response_report_status_zero() {
		let transport: Error = TransportError::network(std::io::Error::other("reset")).into();
		let cancelled = Error::Cancelled { reason: "logout".into() };

		assert_eq!(transport.status(), 0);
		assert_eq!(cancelled.status(), 0);
		assert!(cancelled.is_cancelled());
		assert!(!transport.is_cancelled());
	}

	#[test]
	fn body_preview_truncates_large_bodies() {
		let body = vec![b'a'; BODY_PREVIEW_LIMIT * 2];

		match Error::from_status(500, &body) {
			Error::Status { body, .. } => assert_eq!(body.len(), BODY_PREVIEW_LIMIT),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let error: Error = store_error.clone().into();

		assert!(error.to_string().contains("disk full"));

		let source = StdError::source(&error)
			.expect("Session error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
