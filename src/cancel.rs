//! Generation-based cancellation of in-flight requests.
//!
//! Every request captures the [`CancellationGeneration`] current at dispatch. [`cancel_all`]
//! retires that generation and installs a fresh one, so requests issued afterwards are unaffected
//! while everything captured earlier aborts with [`Error::Cancelled`], including requests parked
//! in a retry backoff.
//!
//! [`cancel_all`]: CancellationRegistry::cancel_all

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::_prelude::*;

/// Reason reported when a generation is cancelled without an explicit one.
pub const DEFAULT_CANCEL_REASON: &str = "Cancelled";

/// Cancellation signal shared by every request dispatched within one generation.
#[derive(Clone, Debug)]
pub struct CancellationGeneration {
	id: u64,
	token: CancellationToken,
	reason: Arc<Mutex<Option<String>>>,
}
impl CancellationGeneration {
	fn new(id: u64) -> Self {
		Self { id, token: CancellationToken::new(), reason: Default::default() }
	}

	/// Monotonic identifier; each `cancel_all` advances it by one.
	pub fn id(&self) -> u64 {
		self.id
	}

	/// Returns `true` once the generation has been retired.
	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	/// Returns the cancellation reason once the generation has been retired.
	pub fn reason(&self) -> Option<String> {
		self.reason.lock().clone()
	}

	/// Resolves with the cancellation reason when the generation is retired.
	pub async fn cancelled(&self) -> String {
		self.token.cancelled().await;

		self.reason().unwrap_or_else(|| DEFAULT_CANCEL_REASON.into())
	}

	/// Runs `fut` until it completes or the generation is retired, whichever happens first.
	///
	/// A generation already retired at call time aborts without polling `fut`.
	pub async fn guard<T, F>(&self, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		tokio::select! {
			biased;
			reason = self.cancelled() => Err(Error::Cancelled { reason }),
			result = fut => result,
		}
	}

	fn cancel(&self, reason: String) {
		// Reason must be visible before waiters wake.
		self.reason.lock().get_or_insert(reason);
		self.token.cancel();
	}
}

/// Holder of the current cancellation generation.
#[derive(Debug)]
pub struct CancellationRegistry {
	current: Mutex<CancellationGeneration>,
}
impl CancellationRegistry {
	/// Returns the generation new requests should capture.
	pub fn current(&self) -> CancellationGeneration {
		self.current.lock().clone()
	}

	/// Aborts every request captured in the current generation and starts a new one.
	///
	/// Calling this with nothing in flight still rotates the generation and is otherwise a no-op.
	/// Returns the retired generation's identifier.
	pub fn cancel_all(&self, reason: Option<&str>) -> u64 {
		let retired = {
			let mut current = self.current.lock();
			let next = CancellationGeneration::new(current.id + 1);

			std::mem::replace(&mut *current, next)
		};

		retired.cancel(reason.unwrap_or(DEFAULT_CANCEL_REASON).to_owned());

		retired.id
	}
}
impl Default for CancellationRegistry {
	fn default() -> Self {
		Self { current: Mutex::new(CancellationGeneration::new(0)) }
	}
}
