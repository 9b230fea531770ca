//! Retry policy: which failures are retried and how long to wait between attempts.
//!
//! Only failures where no response was received are eligible. Responses of any status,
//! including 5xx, are handed to the caller untouched. Delays grow exponentially as
//! `base * 2^(attempt - 1)` for attempts `1..=max_retries`, with optional proportional jitter.

// self
use crate::{_prelude::*, error::TransportError};

/// Retries allowed when the configuration does not say otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Base backoff delay when the configuration does not say otherwise.
pub const DEFAULT_BASE_DELAY: Duration = Duration::milliseconds(100);

/// Which transport failures qualify for a retry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryCondition {
	/// Connection-level failures on idempotent methods only.
	#[default]
	SafeRequest,
	/// Connection-level failures on any method.
	NetworkError,
}

/// Backoff schedule plus eligibility rules applied uniformly to every request of a client.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
	/// Maximum number of retries after the initial attempt.
	pub max_retries: u32,
	/// Delay before the first retry.
	pub base_delay: Duration,
	/// Failure classification.
	pub condition: RetryCondition,
	/// Extra random delay as a fraction of the computed delay, in `0.0..=1.0`.
	pub jitter: f64,
}
impl RetryPolicy {
	/// Creates a policy allowing `max_retries` retries with the default base delay.
	pub fn new(max_retries: u32) -> Self {
		Self {
			max_retries,
			base_delay: DEFAULT_BASE_DELAY,
			condition: RetryCondition::default(),
			jitter: 0.0,
		}
	}

	/// Policy that never retries.
	pub fn disabled() -> Self {
		Self::new(0)
	}

	/// Overrides the base delay; negative values are clamped to zero.
	pub fn with_base_delay(mut self, delay: Duration) -> Self {
		self.base_delay = if delay.is_negative() { Duration::ZERO } else { delay };

		self
	}

	/// Overrides the failure classification.
	pub fn with_condition(mut self, condition: RetryCondition) -> Self {
		self.condition = condition;

		self
	}

	/// Adds proportional jitter, clamped to `0.0..=1.0`.
	pub fn with_jitter(mut self, ratio: f64) -> Self {
		self.jitter = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };

		self
	}

	/// Returns the un-jittered delay for a 1-based retry attempt, or `None` once the budget is
	/// spent.
	pub fn backoff(&self, attempt: u32) -> Option<Duration> {
		if attempt == 0 || attempt > self.max_retries {
			return None;
		}

		if self.base_delay.is_zero() {
			return Some(Duration::ZERO);
		}

		Some(
			2_i32
				.checked_pow(attempt - 1)
				.and_then(|factor| self.base_delay.checked_mul(factor))
				.unwrap_or(Duration::MAX),
		)
	}

	/// Returns every un-jittered delay the policy can schedule, in order.
	pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
		(1..=self.max_retries).map_while(|attempt| self.backoff(attempt))
	}

	/// Returns `true` when `error` on a `method` request qualifies for a retry.
	///
	/// Only network failures qualify. Timeouts and failures after the response started arriving
	/// are terminal, since the request may already have reached the server.
	pub fn is_retryable(&self, method: &Method, error: &TransportError) -> bool {
		if !error.is_network() {
			return false;
		}

		match self.condition {
			RetryCondition::SafeRequest => is_idempotent(method),
			RetryCondition::NetworkError => true,
		}
	}

	/// Decides whether the failed `attempt` (1-based) is retried and how long to wait first.
	pub fn next_delay(
		&self,
		attempt: u32,
		method: &Method,
		error: &TransportError,
	) -> Option<Duration> {
		if !self.is_retryable(method, error) {
			return None;
		}

		self.backoff(attempt).map(|delay| self.jittered(delay))
	}

	fn jittered(&self, delay: Duration) -> Duration {
		if self.jitter <= 0.0 || delay.is_zero() {
			return delay;
		}

		let extra = delay * (self.jitter * rand::random::<f64>());

		delay.checked_add(extra).unwrap_or(delay)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_RETRIES)
	}
}

/// Returns `true` for methods that can be repeated without additional side effects.
pub fn is_idempotent(method: &Method) -> bool {
	matches!(
		*method,
		Method::GET | Method::HEAD | Method::OPTIONS | Method::PUT | Method::DELETE | Method::TRACE
	)
}
