mod common;

// std
use std::time::Duration as StdDuration;
// self
use common::{Step, config, factory};
use rest_session::{
	error::{Error, TransportError},
	retry::RetryCondition,
};

#[tokio::test(start_paused = true)]
async fn network_failures_back_off_exponentially() -> color_eyre::Result<()> {
	let (factory, transport, _) = factory([Step::Reset, Step::Reset, Step::Reset]);
	let client = factory.build(config());

	client.get::<serde_json::Value>("/api/v1/auth/user").await?;

	let arrivals = transport.arrivals();
	let gaps = arrivals.windows(2).map(|pair| pair[1] - pair[0]).collect::<Vec<_>>();

	assert_eq!(transport.calls(), 4);
	assert_eq!(
		gaps,
		vec![
			StdDuration::from_millis(100),
			StdDuration::from_millis(200),
			StdDuration::from_millis(400)
		]
	);

	Ok(())
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_surface_the_last_failure() {
	let (factory, transport, _) =
		factory([Step::Reset, Step::Reset, Step::Reset, Step::Reset, Step::Respond(200, "{}")]);
	let client = factory.build(config());
	let err = client
		.get::<serde_json::Value>("/api/v1/auth/user")
		.await
		.expect_err("Fourth failure should not be retried.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	assert_eq!(err.status(), 0);
	assert_eq!(transport.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn unsafe_methods_are_not_retried_by_default() {
	let (factory, transport, _) = factory([Step::Reset]);
	let client = factory.build(config());
	let err = client
		.post::<_, serde_json::Value>("/api/v1/auth/forgot", &serde_json::json!({}))
		.await
		.expect_err("POST should not be retried on a connection reset.");

	assert!(matches!(err, Error::Transport(_)));
	assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn network_error_condition_retries_any_method() {
	let (factory, transport, _) = factory([Step::Reset]);
	let mut config = config();

	config.retry_condition = RetryCondition::NetworkError;

	let client = factory.build(config);

	client
		.post::<_, serde_json::Value>("/api/v1/auth/forgot", &serde_json::json!({}))
		.await
		.expect("Retried POST should succeed.");

	assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn timeouts_and_error_statuses_are_terminal() {
	let (factory, transport, _) = factory([Step::Timeout, Step::Respond(502, "bad gateway")]);
	let client = factory.build(config());
	let timeout = client
		.get::<serde_json::Value>("/api/v1/a")
		.await
		.expect_err("Timeouts should not be retried.");
	let status = client
		.get::<serde_json::Value>("/api/v1/b")
		.await
		.expect_err("Error statuses should not be retried.");

	assert!(matches!(timeout, Error::Transport(ref e) if e.is_timeout()));
	assert!(matches!(status, Error::Status { status: 502, ref body } if body == "bad gateway"));
	assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn zero_retries_disable_the_policy() {
	let (factory, transport, _) = factory([Step::Reset]);
	let mut config = config();

	config.max_retries = 0;

	let client = factory.build(config);

	assert!(client.get::<serde_json::Value>("/api/v1/a").await.is_err());
	assert_eq!(transport.calls(), 1);
}
