//! Transport primitives for REST calls.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. The client layer builds an
//! [`ApiRequest`], hands it to the transport, and receives an [`ApiResponse`] for every answer the
//! server gave, successful or not. Transports report a [`TransportError`] only when no response
//! was received, which is what the retry policy keys off.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, DecodeError, TransportError},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a single request.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back every client a
/// factory hands out. They must not retry, follow auth logic, or interpret status codes; the
/// client layer owns all of that.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with whatever response the server produced.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// Outgoing request as seen by interceptors and transports.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL including query parameters.
	pub url: Url,
	/// Request headers.
	pub headers: HeaderMap,
	/// Serialized body, if any.
	pub body: Option<Vec<u8>>,
	/// Per-request timeout applied by the transport.
	pub timeout: Option<Duration>,
}
impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None, timeout: None }
	}

	/// Serializes `body` as JSON and sets the matching content type.
	pub fn with_json_body<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let bytes =
			serde_json::to_vec(body).map_err(|source| ConfigError::RequestBody { source })?;

		self.headers
			.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

		self.body = Some(bytes);

		Ok(self)
	}

	/// Sets the per-request timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Appends query pairs to the URL.
	pub fn with_query<'a>(mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
		self.url.query_pairs_mut().extend_pairs(pairs);

		self
	}

	/// Returns the current `Authorization` header value, if any.
	pub fn authorization(&self) -> Option<&str> {
		self.headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok())
	}

	/// Sets the `Authorization` header to carry `token`.
	pub fn set_bearer(&mut self, token: &TokenSecret) -> Result<(), ConfigError> {
		let mut value = header::HeaderValue::from_str(&token.authorization_value())
			.map_err(|source| ConfigError::InvalidHeader { source })?;

		value.set_sensitive(true);
		self.headers.insert(header::AUTHORIZATION, value);

		Ok(())
	}

	/// Removes any `Authorization` header.
	pub fn clear_bearer(&mut self) {
		self.headers.remove(header::AUTHORIZATION);
	}
}

/// Response received from the server, regardless of status.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with no headers.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Adds a header, ignoring names or values that are not valid HTTP.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) =
			(header::HeaderName::from_bytes(name.as_bytes()), header::HeaderValue::from_str(value))
		{
			self.headers.append(name, value);
		}

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		StatusCode::from_u16(self.status).map(|status| status.is_success()).unwrap_or(false)
	}

	/// Decodes the body as JSON, reporting the failing field path on error.
	///
	/// An empty body decodes as JSON `null`, so `()` and `Option<T>` targets accept it.
	pub fn json<T>(&self) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let body: &[u8] =
			if self.body.iter().all(u8::is_ascii_whitespace) { b"null" } else { &self.body };
		let mut deserializer = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError::Json { source })
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
		let mut builder = self.0.request(request.method, request.url).headers(request.headers);

		if let Some(timeout) = request.timeout.and_then(|t| std::time::Duration::try_from(t).ok()) {
			builder = builder.timeout(timeout);
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder.send().await?;
		let status = response.status().as_u16();
		let headers = response.headers().to_owned();
		let body = response.bytes().await.map_err(TransportError::response)?.to_vec();

		Ok(ApiResponse { status, headers, body })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(self.send(request))
	}
}
