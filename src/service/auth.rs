// self
use crate::{
	_prelude::*,
	client::{ApiClient, ClientConfig, ClientFactory, ClientPair},
	http::HttpTransport,
	obs::{self, CallKind, CallOutcome, CallSpan},
	pagination::{Page, PageRequest},
	pipeline::AuthPipeline,
	service::model::*,
};

/// Minimum spacing between two server-side login records.
pub const LOGIN_RECORD_INTERVAL: Duration = Duration::hours(24);

const LOGINS_ITEMS_KEY: &str = "users";

/// Result of [`AuthService::record_login_if_necessary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginCheck {
	/// No previous login was known; the instant was recorded locally only.
	FirstSeen,
	/// The last recorded login is too recent; nothing was sent.
	Recent {
		/// Time since the last recorded login.
		elapsed: Duration,
	},
	/// The login was recorded server-side and the local instant refreshed.
	Recorded,
}

/// Authentication endpoints of one backend.
///
/// Token-issuing calls go through the anonymous client and persist the `Authorization: Bearer`
/// header they receive; everything else uses the authenticated client.
pub struct AuthService<T>
where
	T: ?Sized,
{
	clients: ClientPair<T>,
	pipeline: Arc<AuthPipeline>,
	login_guard: AsyncMutex<()>,
}
impl<T> AuthService<T>
where
	T: ?Sized + HttpTransport,
{
	/// Builds both clients for `config` from `factory`.
	pub fn new(factory: &ClientFactory<T>, config: ClientConfig) -> Self {
		Self {
			clients: factory.pair(config),
			pipeline: factory.pipeline().clone(),
			login_guard: AsyncMutex::new(()),
		}
	}

	/// Returns the client pair.
	pub fn clients(&self) -> &ClientPair<T> {
		&self.clients
	}

	/// Returns the pipeline the authenticated client runs through.
	pub fn pipeline(&self) -> &Arc<AuthPipeline> {
		&self.pipeline
	}

	/// Returns `true` when a non-blank token is stored.
	pub fn is_logged_in(&self) -> Result<bool> {
		self.pipeline.is_logged_in()
	}

	/// Signs in with email and password.
	///
	/// Passing `account_id` selects (or switches to) that account; the token issued for it
	/// replaces the stored one.
	pub async fn login(
		&self,
		email: &str,
		password: &str,
		account_id: Option<&str>,
	) -> Result<LoginResponse> {
		self.issue(Method::POST, "auth/login", &LoginBody { email, password, account_id }).await
	}

	/// Signs in with a Google identity token.
	pub async fn google_login(
		&self,
		token: &str,
		account_id: Option<&str>,
	) -> Result<LoginResponse> {
		self.issue(Method::POST, "auth/google", &GoogleLoginBody { token, account_id }).await
	}

	/// Links a Google identity to the signed-in user.
	pub async fn link_google(&self, token: &str) -> Result<Profile> {
		let client = &self.clients.authenticated;

		client.post(&client.endpoint("auth/linkGoogle"), &LinkGoogleBody { token }).await
	}

	/// Redeems a welcome link nonce.
	pub async fn welcome(&self, nonce: &str) -> Result<RecoverResponse> {
		self.issue(Method::POST, "auth/welcome", &WelcomeBody { nonce }).await
	}

	/// Redeems a recovery code sent by [`forgot_password`](Self::forgot_password).
	pub async fn recover_password(
		&self,
		email: Option<&str>,
		phone: Option<&str>,
		code: &str,
	) -> Result<RecoverResponse> {
		self.issue(Method::PUT, "auth/recover", &RecoverBody { email, phone, code }).await
	}

	/// Forgets the stored token.
	pub fn logout(&self) -> Result<()> {
		self.pipeline.logout()
	}

	/// Records the login server-side at most once per [`LOGIN_RECORD_INTERVAL`].
	pub async fn record_login_if_necessary(&self) -> Result<LoginCheck> {
		self.record_login_if_necessary_at(OffsetDateTime::now_utc()).await
	}

	/// Same as [`record_login_if_necessary`](Self::record_login_if_necessary) with an explicit
	/// clock.
	///
	/// Concurrent checks are serialized so one elapsed interval yields one server call. A failed
	/// call is returned and leaves the local instant untouched.
	pub async fn record_login_if_necessary_at(&self, now: OffsetDateTime) -> Result<LoginCheck> {
		const KIND: CallKind = CallKind::LoginCheck;

		let span = CallSpan::new(KIND, "record_login_if_necessary");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.check_login(now)).await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Fetches one page of the login history.
	pub async fn list_logins(&self, page: &PageRequest) -> Result<Page<Login>> {
		let client = &self.clients.authenticated;

		client.list_page(&client.endpoint("auth/listLogins"), LOGINS_ITEMS_KEY, page).await
	}

	/// Fetches the whole login history, `limit` entries per page.
	pub async fn all_logins(&self, limit: u32) -> Result<Vec<Login>> {
		let client = &self.clients.authenticated;

		client.load_all(&client.endpoint("auth/listLogins"), LOGINS_ITEMS_KEY, limit).await
	}

	/// Returns the identity behind the stored token.
	pub async fn current_user(&self) -> Result<AuthUser> {
		let client = &self.clients.authenticated;

		client.get(&client.endpoint("auth/user")).await
	}

	/// Lists the accounts the signed-in user can switch to.
	pub async fn accounts(&self) -> Result<Vec<Account>> {
		#[derive(Deserialize)]
		struct Accounts {
			#[serde(default)]
			accounts: Option<Vec<Account>>,
		}

		let client = &self.clients.authenticated;
		let body = client.get::<Option<Accounts>>(&client.endpoint("auth/accounts")).await?;

		Ok(body.and_then(|body| body.accounts).unwrap_or_default())
	}

	/// Replaces the signed-in user's password.
	pub async fn change_password(&self, existing: &str, password: &str) -> Result<()> {
		self.send_void(
			&self.clients.authenticated,
			Method::PUT,
			"auth/password",
			&ChangePasswordBody { existing, password },
		)
		.await
	}

	/// Asks the backend to send a recovery code by `method` (for example `email` or `sms`).
	pub async fn forgot_password(
		&self,
		email: Option<&str>,
		phone: Option<&str>,
		method: &str,
	) -> Result<()> {
		self.send_void(
			&self.clients.authenticated,
			Method::POST,
			"auth/forgot",
			&ForgotPasswordBody { email, phone, method },
		)
		.await
	}

	async fn check_login(&self, now: OffsetDateTime) -> Result<LoginCheck> {
		let _guard = self.login_guard.lock().await;
		let session = self.pipeline.session();
		let Some(previous) = session.last_login_at()? else {
			session.record_login_at(now)?;

			return Ok(LoginCheck::FirstSeen);
		};
		let elapsed = now - previous;

		if elapsed < LOGIN_RECORD_INTERVAL {
			return Ok(LoginCheck::Recent { elapsed });
		}

		self.send_void(&self.clients.authenticated, Method::POST, "auth/recordLogin", &Empty {})
			.await?;
		session.record_login_at(now)?;

		Ok(LoginCheck::Recorded)
	}

	async fn issue<B, R>(&self, method: Method, tail: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let client = &self.clients.anonymous;
		let request = client.request(method, &client.endpoint(tail))?.with_json_body(body)?;
		let response = client.send(request).await?;

		self.pipeline.persist_bearer(&response)?;

		Ok(response.json()?)
	}

	async fn send_void<B>(
		&self,
		client: &ApiClient<T>,
		method: Method,
		tail: &str,
		body: &B,
	) -> Result<()>
	where
		B: ?Sized + Serialize,
	{
		let request = client.request(method, &client.endpoint(tail))?.with_json_body(body)?;

		client.send(request).await?;

		Ok(())
	}
}
impl<T> Debug for AuthService<T>
where
	T: ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthService").field("clients", &self.clients).finish()
	}
}

#[derive(Serialize)]
struct Empty {}
