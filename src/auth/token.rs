//! OAuth1 token records and their one-way lifecycle.
//!
//! A token starts as an `unauthorized` request token bound to a callback URL, is authorized
//! for a service identity, and is finally promoted to a permanent access token. Promotion
//! discards the request-scoped key/secret and mints the access pair; it happens once.

// self
use crate::{
	_prelude::*,
	auth::{RecordId, Secret, ServiceIdentity, UserType, secret},
};

/// Lifecycle state of a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
	/// Request token, not yet bound to an identity.
	Unauthorized,
	/// Bound to an identity, still request-scoped.
	Authorized,
	/// Terminal access token.
	Permanent,
}
impl TokenState {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenState::Unauthorized => "unauthorized",
			TokenState::Authorized => "authorized",
			TokenState::Permanent => "permanent",
		}
	}
}
impl Display for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Illegal lifecycle transitions.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenStateError {
	/// The transition is not allowed from the current state.
	#[error("Token cannot be {action} while {state}.")]
	InvalidTransition {
		/// Attempted action label.
		action: &'static str,
		/// State the token was in.
		state: TokenState,
	},
	/// The identity is unsaved or inactive.
	#[error("Identity `{username}` cannot authorize tokens.")]
	InvalidPrincipal {
		/// Username of the rejected identity.
		username: String,
	},
}

/// OAuth1 credential pair bound to a consumer and, once authorized, an identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Store-assigned id; `None` until persisted.
	pub id: Option<RecordId>,
	/// Owning consumer.
	pub consumer: RecordId,
	/// Public token key.
	pub key: String,
	/// Token secret; callers must avoid logging it.
	pub secret: Secret,
	/// OAuth1 verifier issued with the request token.
	pub verifier: Secret,
	/// Callback the request token was issued for.
	pub callback_url: Url,
	/// Identity that authorized the token.
	pub authorized_identity: Option<RecordId>,
	/// User type the identity acts as.
	pub user_type: Option<UserType>,
	/// Current lifecycle state.
	pub state: TokenState,
	/// Issue instant of the request token.
	pub created_at: OffsetDateTime,
	/// Authorization instant.
	pub authorized_at: Option<OffsetDateTime>,
	/// Promotion instant.
	pub promoted_at: Option<OffsetDateTime>,
}
impl Token {
	/// Issues an unsaved, unauthorized request token for `consumer`.
	pub fn request(consumer: RecordId, callback_url: Url) -> Self {
		Self {
			id: None,
			consumer,
			key: secret::generate_token(),
			secret: Secret::generate(),
			verifier: Secret::generate(),
			callback_url,
			authorized_identity: None,
			user_type: None,
			state: TokenState::Unauthorized,
			created_at: OffsetDateTime::now_utc(),
			authorized_at: None,
			promoted_at: None,
		}
	}

	/// Binds the token to `identity` acting as `user_type`.
	pub fn authorize(
		&mut self,
		identity: &ServiceIdentity,
		user_type: UserType,
		instant: OffsetDateTime,
	) -> Result<(), TokenStateError> {
		if self.state != TokenState::Unauthorized {
			return Err(TokenStateError::InvalidTransition {
				action: "authorized",
				state: self.state,
			});
		}

		let identity_id = identity
			.id
			.filter(|_| identity.is_valid_principal())
			.ok_or_else(|| TokenStateError::InvalidPrincipal {
				username: identity.username.to_string(),
			})?;

		self.authorized_identity = Some(identity_id);
		self.user_type = Some(user_type);
		self.state = TokenState::Authorized;
		self.authorized_at = Some(instant);

		Ok(())
	}

	/// Converts an authorized request token into a permanent access token.
	pub fn promote(&mut self, instant: OffsetDateTime) -> Result<(), TokenStateError> {
		if self.state != TokenState::Authorized {
			return Err(TokenStateError::InvalidTransition {
				action: "promoted",
				state: self.state,
			});
		}

		self.key = secret::generate_token();
		self.secret = Secret::generate();
		self.state = TokenState::Permanent;
		self.promoted_at = Some(instant);

		Ok(())
	}

	/// Returns `true` once the token is a permanent access token.
	pub fn is_permanent(&self) -> bool {
		self.state == TokenState::Permanent
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("id", &self.id)
			.field("consumer", &self.consumer)
			.field("key", &self.key)
			.field("secret", &"<redacted>")
			.field("callback_url", &self.callback_url.as_str())
			.field("authorized_identity", &self.authorized_identity)
			.field("state", &self.state)
			.field("promoted_at", &self.promoted_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::{PasswordHash, Username};

	fn identity(id: Option<u64>, is_active: bool) -> ServiceIdentity {
		ServiceIdentity {
			id: id.map(RecordId),
			username: Username::new("StylaApiAdminUser").expect("Username fixture should be valid."),
			first_name: "Styla".into(),
			last_name: "Api Connector".into(),
			email: "stylaapiadmin.a@b.com".into(),
			password_hash: PasswordHash::hash(&Secret::new("pw"))
				.expect("Password fixture should hash."),
			role: None,
			is_active,
			created_at: macros::datetime!(2025-01-01 00:00 UTC),
		}
	}

	fn request_token() -> Token {
		Token::request(
			RecordId(1),
			Url::parse("https://live.example.com/api").expect("Callback fixture should parse."),
		)
	}

	fn admin() -> UserType {
		UserType::new("admin").expect("User type fixture should be valid.")
	}

	#[test]
	fn lifecycle_moves_forward_once_and_rotates_credentials() {
		let mut token = request_token();
		let request_key = token.key.clone();
		let request_secret = token.secret.clone();
		let now = macros::datetime!(2025-01-01 00:10 UTC);

		token.authorize(&identity(Some(7), true), admin(), now).expect("Authorize should succeed.");

		assert_eq!(token.state, TokenState::Authorized);
		assert_eq!(token.authorized_identity, Some(RecordId(7)));
		assert_eq!(token.key, request_key, "Authorization keeps the request credentials.");

		token.promote(now).expect("Promotion should succeed.");

		assert!(token.is_permanent());
		assert_ne!(token.key, request_key);
		assert_ne!(token.secret, request_secret);
		assert_eq!(token.promoted_at, Some(now));
	}

	#[test]
	fn illegal_transitions_are_rejected() {
		let now = OffsetDateTime::now_utc();
		let mut token = request_token();

		assert_eq!(
			token.promote(now),
			Err(TokenStateError::InvalidTransition {
				action: "promoted",
				state: TokenState::Unauthorized
			})
		);

		token.authorize(&identity(Some(1), true), admin(), now).expect("Authorize should succeed.");
		token.promote(now).expect("Promotion should succeed.");

		let key = token.key.clone();

		assert!(token.promote(now).is_err());
		assert!(token.authorize(&identity(Some(1), true), admin(), now).is_err());
		assert_eq!(token.key, key, "Rejected transitions must not touch credentials.");
	}

	#[test]
	fn authorization_requires_a_valid_principal() {
		let now = OffsetDateTime::now_utc();
		let mut token = request_token();

		assert!(matches!(
			token.authorize(&identity(None, true), admin(), now),
			Err(TokenStateError::InvalidPrincipal { .. })
		));
		assert!(matches!(
			token.authorize(&identity(Some(3), false), admin(), now),
			Err(TokenStateError::InvalidPrincipal { .. })
		));
		assert_eq!(token.state, TokenState::Unauthorized);
	}

	#[test]
	fn debug_output_redacts_secret() {
		let token = request_token();

		assert!(!format!("{token:?}").contains(token.secret.expose()));
	}
}
