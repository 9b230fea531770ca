// self
use crate::{
	_prelude::*,
	retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, RetryCondition, RetryPolicy},
};

/// Request timeout applied when the configuration does not say otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(60);
/// API version used when the configuration does not say otherwise.
pub const DEFAULT_API_VERSION: u32 = 1;

/// Errors raised while validating a [`ClientConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ClientConfigError {
	/// Base URL could not be parsed.
	#[error("Base URL `{url}` is invalid: {reason}.")]
	InvalidBaseUrl {
		/// Supplied base URL.
		url: String,
		/// Parser diagnostic.
		reason: String,
	},
	/// Base URL must use `http` or `https`.
	#[error("Base URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Scheme that failed validation.
		scheme: String,
	},
	/// Base URL cannot have paths joined onto it.
	#[error("Base URL `{url}` cannot be used as a base.")]
	CannotBeABase {
		/// Supplied base URL.
		url: String,
	},
	/// API versions start at 1.
	#[error("API version must be at least 1.")]
	InvalidVersion,
	/// Requests need a positive timeout.
	#[error("Request timeout must be positive.")]
	NonPositiveTimeout,
	/// Backoff cannot run backwards.
	#[error("Retry base delay must not be negative.")]
	NegativeRetryDelay,
}

/// Immutable settings for one client bound to a base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
	/// Backend origin every request path is resolved against.
	pub base_url: Url,
	/// API version embedded in resource paths (`/api/v{version}/...`).
	pub version: u32,
	/// Per-request timeout.
	pub timeout: Duration,
	/// Retries allowed after the initial attempt.
	pub max_retries: u32,
	/// Delay before the first retry; later retries double it.
	pub retry_base_delay: Duration,
	/// Which transport failures qualify for a retry.
	pub retry_condition: RetryCondition,
	/// Installs token injection, cancellation, and auth-failure handling when `true`.
	pub with_auth_interceptors: bool,
}
impl ClientConfig {
	/// Starts a builder for `base_url` seeded with the defaults.
	pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Returns the retry policy derived from this configuration.
	pub fn retry_policy(&self) -> RetryPolicy {
		RetryPolicy::new(self.max_retries)
			.with_base_delay(self.retry_base_delay)
			.with_condition(self.retry_condition)
	}

	/// Returns a copy with auth interceptors disabled.
	pub fn anonymous(&self) -> Self {
		Self { with_auth_interceptors: false, ..self.clone() }
	}

	/// Returns a copy with auth interceptors enabled.
	pub fn authenticated(&self) -> Self {
		Self { with_auth_interceptors: true, ..self.clone() }
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	/// Unparsed base URL.
	pub base_url: String,
	/// API version.
	pub version: u32,
	/// Per-request timeout.
	pub timeout: Duration,
	/// Retries allowed after the initial attempt.
	pub max_retries: u32,
	/// Delay before the first retry.
	pub retry_base_delay: Duration,
	/// Which transport failures qualify for a retry.
	pub retry_condition: RetryCondition,
	/// Whether auth interceptors are installed.
	pub with_auth_interceptors: bool,
}
impl ClientConfigBuilder {
	/// Creates a builder seeded with the defaults.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			version: DEFAULT_API_VERSION,
			timeout: DEFAULT_TIMEOUT,
			max_retries: DEFAULT_MAX_RETRIES,
			retry_base_delay: DEFAULT_BASE_DELAY,
			retry_condition: RetryCondition::default(),
			with_auth_interceptors: true,
		}
	}

	/// Sets the API version.
	pub fn version(mut self, version: u32) -> Self {
		self.version = version;

		self
	}

	/// Sets the per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Sets how many retries follow the initial attempt.
	pub fn max_retries(mut self, retries: u32) -> Self {
		self.max_retries = retries;

		self
	}

	/// Sets the delay before the first retry.
	pub fn retry_base_delay(mut self, delay: Duration) -> Self {
		self.retry_base_delay = delay;

		self
	}

	/// Sets which transport failures are retried.
	pub fn retry_condition(mut self, condition: RetryCondition) -> Self {
		self.retry_condition = condition;

		self
	}

	/// Enables or disables auth interceptors.
	pub fn with_auth_interceptors(mut self, enabled: bool) -> Self {
		self.with_auth_interceptors = enabled;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let base_url = Url::parse(self.base_url.trim()).map_err(|e| {
			ClientConfigError::InvalidBaseUrl { url: self.base_url.clone(), reason: e.to_string() }
		})?;

		validate_base_url(&base_url)?;

		if self.version == 0 {
			return Err(ClientConfigError::InvalidVersion);
		}
		if !self.timeout.is_positive() {
			return Err(ClientConfigError::NonPositiveTimeout);
		}
		if self.retry_base_delay.is_negative() {
			return Err(ClientConfigError::NegativeRetryDelay);
		}

		Ok(ClientConfig {
			base_url,
			version: self.version,
			timeout: self.timeout,
			max_retries: self.max_retries,
			retry_base_delay: self.retry_base_delay,
			retry_condition: self.retry_condition,
			with_auth_interceptors: self.with_auth_interceptors,
		})
	}
}

fn validate_base_url(url: &Url) -> Result<(), ClientConfigError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(ClientConfigError::UnsupportedScheme { scheme: url.scheme().to_owned() });
	}
	if url.cannot_be_a_base() {
		return Err(ClientConfigError::CannotBeABase { url: url.to_string() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_documented_values() {
		let config = ClientConfig::builder("https://api.example.com")
			.build()
			.expect("Default configuration should be valid.");

		assert_eq!(config.version, 1);
		assert_eq!(config.timeout, Duration::seconds(60));
		assert_eq!(config.max_retries, 3);
		assert_eq!(config.retry_base_delay, Duration::milliseconds(100));
		assert!(config.with_auth_interceptors);
		assert!(!config.anonymous().with_auth_interceptors);
		assert!(config.anonymous().authenticated().with_auth_interceptors);
	}

	#[test]
	fn invalid_settings_are_rejected() {
		let err = |builder: ClientConfigBuilder| {
			builder.build().expect_err("Configuration should fail validation.")
		};

		assert!(matches!(
			err(ClientConfig::builder("not a url")),
			ClientConfigError::InvalidBaseUrl { .. }
		));
		assert_eq!(
			err(ClientConfig::builder("ftp://files.example.com")),
			ClientConfigError::UnsupportedScheme { scheme: "ftp".into() }
		);
		assert_eq!(
			err(ClientConfig::builder("https://api.example.com").version(0)),
			ClientConfigError::InvalidVersion
		);
		assert_eq!(
			err(ClientConfig::builder("https://api.example.com").timeout(Duration::ZERO)),
			ClientConfigError::NonPositiveTimeout
		);
		assert_eq!(
			err(ClientConfig::builder("https://api.example.com")
				.retry_base_delay(Duration::milliseconds(-1))),
			ClientConfigError::NegativeRetryDelay
		);
	}

	#[test]
	fn retry_policy_mirrors_configuration() {
		let config = ClientConfig::builder("http://localhost:8080")
			.max_retries(5)
			.retry_base_delay(Duration::milliseconds(20))
			.retry_condition(RetryCondition::NetworkError)
			.build()
			.expect("Configuration should be valid.");
		let policy = config.retry_policy();

		assert_eq!(policy.max_retries, 5);
		assert_eq!(policy.base_delay, Duration::milliseconds(20));
		assert_eq!(policy.condition, RetryCondition::NetworkError);
	}
}
