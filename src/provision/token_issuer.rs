//! Consumer and token issuance for the service identity.
//!
//! The issuer walks a token through `unauthorized → authorized → permanent`, persisting after
//! every transition so a run interrupted between authorization and promotion resumes at
//! promotion next time.

// self
use crate::{
	_prelude::*,
	auth::{Consumer, ConsumerName, ServiceIdentity, Token, TokenState, UserType},
	store::{CredentialStore, EntityKey, StoreError},
};

/// How [`TokenIssuer::ensure_access_token`] reached the permanent token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenOutcome {
	/// A new request token was issued, authorized, and promoted.
	Issued,
	/// An existing unauthorized or authorized token was carried to permanent.
	Resumed,
	/// The token was already permanent; nothing was written.
	Reused,
}

/// Permanent token returned by [`TokenIssuer::ensure_access_token`].
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// Persisted permanent token.
	pub token: Token,
	/// Path taken to reach it.
	pub outcome: TokenOutcome,
}

/// Ensures the integration's consumer and its permanent access token.
#[derive(Clone)]
pub struct TokenIssuer {
	store: Arc<dyn CredentialStore>,
	user_type: UserType,
}
impl TokenIssuer {
	/// Creates an issuer authorizing tokens as `user_type`.
	pub fn new(store: Arc<dyn CredentialStore>, user_type: UserType) -> Self {
		Self { store, user_type }
	}

	/// Finds the consumer by name or creates it with fresh credentials.
	pub async fn ensure_consumer(&self, name: &ConsumerName) -> Result<(Consumer, bool)> {
		if let Some(consumer) =
			self.store.find_as::<Consumer>(&EntityKey::Consumer(name.clone())).await?
		{
			return Ok((consumer, false));
		}

		let consumer = self.store.upsert_as(Consumer::generate(name.clone())).await?;

		Ok((consumer, true))
	}

	/// Carries the consumer's token to the permanent state, issuing it first when missing.
	///
	/// `callback` binds a newly issued request token; an existing token keeps its callback.
	pub async fn ensure_access_token(
		&self,
		consumer: &Consumer,
		identity: &ServiceIdentity,
		callback: &Url,
	) -> Result<IssuedToken> {
		let consumer_id = consumer.id.ok_or_else(|| StoreError::Backend {
			message: format!("consumer `{}` is not persisted", consumer.name),
		})?;
		let (mut token, outcome) =
			match self.store.find_as::<Token>(&EntityKey::Token(consumer_id)).await? {
				Some(token) => (token, TokenOutcome::Resumed),
				None => (
					self.store.upsert_as(Token::request(consumer_id, callback.clone())).await?,
					TokenOutcome::Issued,
				),
			};

		if token.state == TokenState::Permanent {
			return Ok(IssuedToken { token, outcome: TokenOutcome::Reused });
		}
		if token.state == TokenState::Unauthorized {
			token.authorize(identity, self.user_type.clone(), OffsetDateTime::now_utc())?;
			token = self.store.upsert_as(token).await?;
		}

		token.promote(OffsetDateTime::now_utc())?;
		token = self.store.upsert_as(token).await?;

		Ok(IssuedToken { token, outcome })
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer").field("user_type", &self.user_type).finish()
	}
}
