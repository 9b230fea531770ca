//! REST clients bound to one base URL, with retry, auth interceptors, and cancellation.
//!
//! An [`ApiClient`] is built by a [`ClientFactory`] from a [`ClientConfig`]. Authenticated clients
//! run every request through the [`AuthPipeline`]: the token is injected fresh on each attempt,
//! the request is tied to the cancellation generation current at dispatch, and a 401/403 clears
//! the session before the error is returned. Anonymous clients skip all three.

mod config;
mod factory;

pub use config::*;
pub use factory::*;

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{ApiRequest, ApiResponse, HttpTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
	pagination::{self, Page, PageRequest},
	pipeline::AuthPipeline,
	retry::RetryPolicy,
};

/// Configured client for one base URL.
pub struct ApiClient<T>
where
	T: ?Sized,
{
	transport: Arc<T>,
	config: Arc<ClientConfig>,
	retry: RetryPolicy,
	pipeline: Option<Arc<AuthPipeline>>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(
		transport: Arc<T>,
		config: ClientConfig,
		pipeline: Option<Arc<AuthPipeline>>,
	) -> Self {
		let retry = config.retry_policy();

		Self { transport, config: Arc::new(config), retry, pipeline }
	}

	/// Returns the configuration the client was built from.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Returns the retry policy applied to every request.
	pub fn retry_policy(&self) -> &RetryPolicy {
		&self.retry
	}

	/// Returns `true` when auth interceptors are installed.
	pub fn is_authenticated(&self) -> bool {
		self.pipeline.is_some()
	}

	/// Builds `/api/v{version}/{tail}`.
	pub fn endpoint(&self, tail: &str) -> String {
		format!("/api/v{}/{}", self.config.version, tail.trim_start_matches('/'))
	}

	/// Builds the resource path `/api/v{version}/{resource}/` or
	/// `/api/v{version}/{resource}/{id}/`.
	pub fn path(&self, resource: &str, id: Option<&str>) -> String {
		let resource = resource.trim_matches('/');

		match id {
			Some(id) => self.endpoint(&format!("{resource}/{id}/")),
			None => self.endpoint(&format!("{resource}/")),
		}
	}

	/// Resolves `path` against the base URL; absolute `http(s)` URLs are used as is.
	pub fn url(&self, path: &str) -> Result<Url> {
		let invalid = |source| ConfigError::InvalidPath { path: path.to_owned(), source };

		if path.starts_with("http://") || path.starts_with("https://") {
			return Ok(Url::parse(path).map_err(invalid)?);
		}

		let joined = format!(
			"{}/{}",
			self.config.base_url.as_str().trim_end_matches('/'),
			path.trim_start_matches('/')
		);

		Ok(Url::parse(&joined).map_err(invalid)?)
	}

	/// Starts a request for `path` carrying the configured timeout.
	pub fn request(&self, method: Method, path: &str) -> Result<ApiRequest> {
		Ok(ApiRequest::new(method, self.url(path)?).with_timeout(self.config.timeout))
	}

	/// Sends `request` and returns the raw 2xx response.
	///
	/// Non-2xx responses become [`Error::Unauthorized`] or [`Error::Status`]; transport failures
	/// are retried per the client's policy before surfacing as [`Error::Transport`].
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.dispatch(request)).await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// `GET path`, decoding the JSON body.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let response = self.send(self.request(Method::GET, path)?).await?;

		Ok(response.json()?)
	}

	/// `POST path` with a JSON body, decoding the JSON response.
	pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let request = self.request(Method::POST, path)?.with_json_body(body)?;

		Ok(self.send(request).await?.json()?)
	}

	/// `PUT path` with a JSON body, decoding the JSON response.
	pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let request = self.request(Method::PUT, path)?.with_json_body(body)?;

		Ok(self.send(request).await?.json()?)
	}

	/// `DELETE path`, decoding the JSON response.
	pub async fn delete<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let response = self.send(self.request(Method::DELETE, path)?).await?;

		Ok(response.json()?)
	}

	/// Fetches one page of a list endpoint.
	///
	/// `limit` and `cursor` are sent as query parameters; items are read from `items_key`.
	pub async fn list_page<I>(
		&self,
		path: &str,
		items_key: &str,
		page: &PageRequest,
	) -> Result<Page<I>>
	where
		I: DeserializeOwned,
	{
		let pairs = page.query_pairs();
		let request = self
			.request(Method::GET, path)?
			.with_query(pairs.iter().map(|(name, value)| (*name, value.as_str())));
		let body = self.send(request).await?.json::<serde_json::Value>()?;

		Ok(Page::from_value(body, items_key)?)
	}

	/// Fetches every page of a list endpoint through the pagination aggregator.
	pub async fn load_all<I>(&self, path: &str, items_key: &str, limit: u32) -> Result<Vec<I>>
	where
		I: DeserializeOwned,
	{
		pagination::load_all(
			|request| async move { self.list_page(path, items_key, &request).await },
			limit,
		)
		.await
	}

	async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
		let Some(pipeline) = &self.pipeline else {
			return self.execute_with_retry(&request, request.clone(), None).await;
		};
		let mut first = request.clone();
		let generation = pipeline.on_request(&mut first)?;
		let result =
			generation.guard(self.execute_with_retry(&request, first, Some(pipeline))).await;

		if let Err(e) = &result {
			if let Error::Cancelled { reason } = e {
				obs::trace_cancelled(generation.id(), reason);
			}

			pipeline.on_response_error(e);
		}

		result
	}

	async fn execute_with_retry(
		&self,
		base: &ApiRequest,
		first: ApiRequest,
		pipeline: Option<&Arc<AuthPipeline>>,
	) -> Result<ApiResponse> {
		let mut next = first;
		let mut attempt = 1;

		loop {
			let method = next.method.clone();

			match self.transport.execute(next).await {
				Ok(response) if response.is_success() => return Ok(response),
				Ok(response) => return Err(Error::from_status(response.status, &response.body)),
				Err(e) => {
					let Some(delay) = self.retry.next_delay(attempt, &method, &e) else {
						return Err(e.into());
					};

					obs::trace_retry(&method, attempt, delay);
					obs::record_call_outcome(CallKind::Request, CallOutcome::Retry);
					tokio::time::sleep(std::time::Duration::try_from(delay).unwrap_or_default())
						.await;

					next = base.clone();

					if let Some(pipeline) = pipeline {
						pipeline.authorize(&mut next)?;
					}

					attempt += 1;
				},
			}
		}
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			config: self.config.clone(),
			retry: self.retry.clone(),
			pipeline: self.pipeline.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("version", &self.config.version)
			.field("authenticated", &self.pipeline.is_some())
			.finish()
	}
}

/// Both client flavors for one base URL.
pub struct ClientPair<T>
where
	T: ?Sized,
{
	/// Client with auth interceptors installed.
	pub authenticated: ApiClient<T>,
	/// Client for pre-authentication endpoints.
	pub anonymous: ApiClient<T>,
}
impl<T> Clone for ClientPair<T>
where
	T: ?Sized,
{
	fn clone(&self) -> Self {
		Self { authenticated: self.authenticated.clone(), anonymous: self.anonymous.clone() }
	}
}
impl<T> Debug for ClientPair<T>
where
	T: ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientPair")
			.field("authenticated", &self.authenticated)
			.field("anonymous", &self.anonymous)
			.finish()
	}
}
