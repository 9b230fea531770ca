// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by session calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("rest_session.call", kind = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for a scheduled retry.
pub fn trace_retry(method: &Method, attempt: u32, delay: Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			%method,
			attempt,
			delay_ms = delay.whole_milliseconds() as u64,
			"retrying request"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (method, attempt, delay);
	}
}

/// Emits a debug event for a request aborted by `cancel_all`.
pub fn trace_cancelled(generation: u64, reason: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(generation, reason, "request cancelled");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (generation, reason);
	}
}

/// Emits a warning for an auth failure that cleared the session.
pub fn trace_auth_lost(status: u16, notified: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(status, notified, "session cleared after auth failure");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (status, notified);
	}
}
