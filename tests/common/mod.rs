#![allow(dead_code)]

// std
use std::{collections::VecDeque, io, sync::Arc};
// crates.io
use parking_lot::Mutex;
use tokio::time::Instant;
// self
#[cfg(feature = "reqwest")] use rest_session::http::ReqwestTransport;
use rest_session::{
	client::{ClientConfig, ClientFactory},
	error::TransportError,
	http::{ApiRequest, ApiResponse, HttpTransport, TransportFuture},
	pipeline::AuthPipeline,
	store::SessionStore,
};

pub const BASE_URL: &str = "https://api.example.com";

/// Outcome replayed by [`RecordingTransport`].
#[derive(Debug)]
pub enum Step {
	Respond(u16, &'static str),
	Reset,
	Timeout,
	Hang,
}

/// In-process transport that replays a script and records when each request arrived.
#[derive(Debug, Default)]
pub struct RecordingTransport {
	script: Mutex<VecDeque<Step>>,
	seen: Mutex<Vec<(Instant, ApiRequest)>>,
}
impl RecordingTransport {
	pub fn new(script: impl IntoIterator<Item = Step>) -> Arc<Self> {
		let script = Mutex::new(script.into_iter().collect());

		Arc::new(Self { script, seen: Default::default() })
	}

	pub fn calls(&self) -> usize {
		self.seen.lock().len()
	}

	pub fn requests(&self) -> Vec<ApiRequest> {
		self.seen.lock().iter().map(|(_, request)| request.clone()).collect()
	}

	pub fn arrivals(&self) -> Vec<Instant> {
		self.seen.lock().iter().map(|(at, _)| *at).collect()
	}
}
impl HttpTransport for RecordingTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		self.seen.lock().push((Instant::now(), request));

		let next = self.script.lock().pop_front();

		Box::pin(async move {
			match next {
				Some(Step::Respond(status, body)) => Ok(ApiResponse::new(status, body.as_bytes())),
				Some(Step::Reset) => Err(TransportError::network(io::Error::new(
					io::ErrorKind::ConnectionReset,
					"connection reset by peer",
				))),
				Some(Step::Timeout) => Err(TransportError::timeout(io::Error::new(
					io::ErrorKind::TimedOut,
					"request timed out",
				))),
				Some(Step::Hang) => std::future::pending().await,
				None => Ok(ApiResponse::new(200, b"{}".as_slice())),
			}
		})
	}
}

pub fn factory(
	script: impl IntoIterator<Item = Step>,
) -> (ClientFactory<RecordingTransport>, Arc<RecordingTransport>, Arc<AuthPipeline>) {
	let transport = RecordingTransport::new(script);
	let pipeline = Arc::new(AuthPipeline::new(SessionStore::in_memory()));

	(ClientFactory::new(transport.clone(), pipeline.clone()), transport, pipeline)
}

pub fn config() -> ClientConfig {
	ClientConfig::builder(BASE_URL)
		.retry_base_delay(time::Duration::milliseconds(100))
		.build()
		.expect("Test client configuration should be valid.")
}

/// Builds a reqwest transport that accepts the self-signed certificates `httpmock` serves.
#[cfg(feature = "reqwest")]
pub fn test_reqwest_transport() -> ReqwestTransport {
	let client = reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestTransport::with_client(client)
}

/// Factory over [`test_reqwest_transport`] sharing `pipeline`.
#[cfg(feature = "reqwest")]
pub fn reqwest_factory(pipeline: Arc<AuthPipeline>) -> ClientFactory<ReqwestTransport> {
	ClientFactory::new(Arc::new(test_reqwest_transport()), pipeline)
}
