//! Authenticated REST session pipeline for versioned JSON backends: bearer token injection,
//! auth-loss recovery, cancellable retries with exponential backoff, and cursor pagination.
//!
//! The crate is organized around an explicit [`pipeline::AuthPipeline`] that owns the session
//! store, the cancellation registry, and the `on_unauthenticated` subscribers. A
//! [`client::ClientFactory`] binds the pipeline to an [`http::HttpTransport`] and hands out
//! [`client::ApiClient`] values in two flavors per base URL: authenticated (interceptors on) and
//! anonymous (interceptors off). List endpoints are flattened by [`pagination::load_all`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cancel;
pub mod client;
pub mod error;
pub mod http;
pub mod obs;
pub mod pagination;
pub mod pipeline;
pub mod retry;
pub mod service;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		client::{ClientConfig, ClientFactory},
		error::TransportError,
		http::{ApiRequest, ApiResponse, HttpTransport, TransportFuture},
		pipeline::AuthPipeline,
		store::SessionStore,
	};

	/// Outcome queued on a [`ScriptedTransport`].
	#[derive(Debug)]
	pub enum Scripted {
		/// Respond with the given status, headers, and body.
		Respond(ApiResponse),
		/// Fail without a response, as a dropped connection would.
		ConnectionLost,
		/// Fail as a timed out request would.
		TimedOut,
		/// Fail after the response started arriving, as a truncated body would.
		Truncated,
		/// Never resolve; used to keep a request in flight.
		Hang,
	}

	/// In-process [`HttpTransport`] that replays scripted outcomes and records every request.
	///
	/// Once the script is exhausted every further request receives an empty `200` response.
	#[derive(Debug, Default)]
	pub struct ScriptedTransport {
		script: Mutex<VecDeque<Scripted>>,
		seen: Mutex<Vec<ApiRequest>>,
	}
	impl ScriptedTransport {
		/// Creates a transport that replays `script` in order.
		pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
			Self { script: Mutex::new(script.into_iter().collect()), seen: Default::default() }
		}

		/// Appends another outcome to the script.
		pub fn push(&self, outcome: Scripted) {
			self.script.lock().push_back(outcome);
		}

		/// Returns a copy of every request observed so far.
		pub fn requests(&self) -> Vec<ApiRequest> {
			self.seen.lock().clone()
		}

		/// Returns how many requests reached the transport.
		pub fn calls(&self) -> usize {
			self.seen.lock().len()
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
			self.seen.lock().push(request);

			let next = self.script.lock().pop_front();

			Box::pin(async move {
				match next {
					Some(Scripted::Respond(response)) => Ok(response),
					Some(Scripted::ConnectionLost) =>
						Err(TransportError::network(std::io::Error::new(
							std::io::ErrorKind::ConnectionReset,
							"connection reset by peer",
						))),
					Some(Scripted::TimedOut) => Err(TransportError::timeout(std::io::Error::new(
						std::io::ErrorKind::TimedOut,
						"request timed out",
					))),
					Some(Scripted::Truncated) => Err(TransportError::response(std::io::Error::new(
						std::io::ErrorKind::UnexpectedEof,
						"response body ended early",
					))),
					Some(Scripted::Hang) => std::future::pending().await,
					None => Ok(json_response(200, "{}")),
				}
			})
		}
	}

	/// Builds a JSON [`ApiResponse`] with the provided status and body.
	pub fn json_response(status: u16, body: &str) -> ApiResponse {
		ApiResponse::new(status, body.as_bytes().to_vec())
	}

	/// Builds a client configuration pointing at `base_url` with a 10 ms retry base delay.
	pub fn test_config(base_url: &str) -> ClientConfig {
		ClientConfig::builder(base_url)
			.retry_base_delay(Duration::milliseconds(10))
			.build()
			.expect("Test client configuration should be valid.")
	}

	/// Builds a factory backed by a [`ScriptedTransport`] and an in-memory session store.
	pub fn scripted_factory(
		script: impl IntoIterator<Item = Scripted>,
	) -> (ClientFactory<ScriptedTransport>, Arc<ScriptedTransport>, Arc<AuthPipeline>) {
		let transport = Arc::new(ScriptedTransport::new(script));
		let pipeline = Arc::new(AuthPipeline::new(SessionStore::in_memory()));
		let factory = ClientFactory::new(transport.clone(), pipeline.clone());

		(factory, transport, pipeline)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, HashSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use ::http::{HeaderMap, Method, StatusCode, header};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
