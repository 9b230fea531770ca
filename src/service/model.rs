// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Identity behind the stored token, as reported by `auth/user`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
	/// Application the user signed into.
	pub app_id: String,
	/// Account the token is scoped to.
	pub account_id: String,
	/// User identifier.
	pub user_id: String,
	/// Sign-in email.
	pub email: String,
	/// Role names granted within the account.
	#[serde(default)]
	pub roles: Vec<String>,
}

/// Account the user can sign into.
///
/// Only the identifying fields are typed; everything else the backend sends is kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
	/// Account identifier, passed as `account_id` when switching accounts.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Remaining account fields.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Body of a successful login.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
	/// Accounts to choose from when the login did not name one.
	#[serde(default)]
	pub accounts: Option<Vec<Account>>,
	/// Cursor over further accounts, if any.
	#[serde(default)]
	pub cursor: Option<String>,
}

/// Body returned by password recovery and welcome links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverResponse {
	/// Temporary password the user must replace.
	pub password: String,
}

/// Entry of the login history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
	/// User who signed in.
	pub user_id: String,
	/// First login instant, as sent by the backend.
	#[serde(default)]
	pub created: String,
	/// Latest login instant, as sent by the backend.
	#[serde(default)]
	pub updated: String,
}

/// Profile of the signed-in user, returned when linking an identity provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	/// Profile identifier.
	pub id: String,
	/// Given name.
	#[serde(default)]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(default)]
	pub last_name: Option<String>,
	/// Contact email.
	pub email: String,
	/// Contact phone.
	#[serde(default)]
	pub phone: Option<String>,
	/// Avatar location.
	#[serde(default)]
	pub image_url: Option<String>,
	/// Creation instant, as sent by the backend.
	#[serde(default)]
	pub created: String,
	/// Last update instant, as sent by the backend.
	#[serde(default)]
	pub updated: String,
	/// Free-form user settings.
	#[serde(default)]
	pub settings: Map<String, Value>,
	/// Free-form decorations.
	#[serde(default)]
	pub decorations: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginBody<'a> {
	pub email: &'a str,
	pub password: &'a str,
	pub account_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleLoginBody<'a> {
	pub token: &'a str,
	pub account_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkGoogleBody<'a> {
	pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct WelcomeBody<'a> {
	pub nonce: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecoverBody<'a> {
	pub email: Option<&'a str>,
	pub phone: Option<&'a str>,
	pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangePasswordBody<'a> {
	pub existing: &'a str,
	pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForgotPasswordBody<'a> {
	pub email: Option<&'a str>,
	pub phone: Option<&'a str>,
	pub method: &'a str,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn accounts_keep_untyped_fields() {
		let account: Account = serde_json::from_value(serde_json::json!({
			"id": "acc-1",
			"name": "Acme",
			"allowJoin": true,
			"branding": { "primaryColor": "#000" }
		}))
		.expect("Account payload should decode.");

		assert_eq!(account.id, "acc-1");
		assert_eq!(account.extra.get("allowJoin"), Some(&Value::Bool(true)));
	}

	#[test]
	fn profiles_tolerate_missing_optional_fields() {
		let profile: Profile = serde_json::from_value(serde_json::json!({
			"id": "p-1",
			"firstName": "Ada",
			"lastName": null,
			"email": "ada@example.com",
			"settings": { "theme": "dark" }
		}))
		.expect("Profile payload should decode.");

		assert_eq!(profile.first_name.as_deref(), Some("Ada"));
		assert_eq!(profile.last_name, None);
		assert_eq!(profile.settings.get("theme"), Some(&Value::from("dark")));
		assert!(profile.decorations.is_empty());
	}

	#[test]
	fn login_body_sends_null_account() {
		let body = serde_json::to_value(LoginBody { email: "a@b.c", password: "pw", account_id: None })
			.expect("Login body should serialize.");

		assert_eq!(
			body,
			serde_json::json!({ "email": "a@b.c", "password": "pw", "accountId": null })
		);
	}
}
