// self
use crate::{
	_prelude::*,
	client::{ApiClient, ClientConfig, ClientPair},
	http::HttpTransport,
	pipeline::AuthPipeline,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestTransport};

/// Hands out clients that share one transport and one [`AuthPipeline`].
///
/// Building is synchronous and cheap; every call yields an independent client, so callers may
/// build one per base URL or per service.
pub struct ClientFactory<T>
where
	T: ?Sized,
{
	transport: Arc<T>,
	pipeline: Arc<AuthPipeline>,
}
impl<T> ClientFactory<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a factory over `transport` and `pipeline`.
	pub fn new(transport: Arc<T>, pipeline: Arc<AuthPipeline>) -> Self {
		Self { transport, pipeline }
	}

	/// Returns the shared transport.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Returns the shared pipeline.
	pub fn pipeline(&self) -> &Arc<AuthPipeline> {
		&self.pipeline
	}

	/// Builds a client; the pipeline is attached only when `with_auth_interceptors` is set.
	pub fn build(&self, config: ClientConfig) -> ApiClient<T> {
		let pipeline = config.with_auth_interceptors.then(|| self.pipeline.clone());

		ApiClient::new(self.transport.clone(), config, pipeline)
	}

	/// Builds the authenticated and anonymous clients for one base URL.
	pub fn pair(&self, config: ClientConfig) -> ClientPair<T> {
		ClientPair {
			authenticated: self.build(config.authenticated()),
			anonymous: self.build(config.anonymous()),
		}
	}
}
#[cfg(feature = "reqwest")]
impl ClientFactory<ReqwestTransport> {
	/// Creates a factory backed by a default reqwest client.
	pub fn with_reqwest(pipeline: Arc<AuthPipeline>) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Ok(Self::new(Arc::new(ReqwestTransport::with_client(client)), pipeline))
	}
}
impl<T> Clone for ClientFactory<T>
where
	T: ?Sized,
{
	fn clone(&self) -> Self {
		Self { transport: self.transport.clone(), pipeline: self.pipeline.clone() }
	}
}
impl<T> Debug for ClientFactory<T>
where
	T: ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientFactory").field("pipeline", &self.pipeline).finish()
	}
}
