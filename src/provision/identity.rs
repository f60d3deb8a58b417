//! Service identity resolution.

// self
use crate::{
	_prelude::*,
	auth::{LoginData, PasswordHash, ServiceIdentity},
	http::RegistrationTransport,
	provision::Connector,
	store::{CredentialStore, EntityKey},
};

/// Service identity resolved for a connect run.
#[derive(Clone, Debug)]
pub struct ResolvedIdentity {
	/// Persisted identity.
	pub identity: ServiceIdentity,
	/// `true` when this call created the identity.
	pub created: bool,
}

impl<T> Connector<T>
where
	T: ?Sized + RegistrationTransport,
{
	/// Looks the service identity up by username, creating it from `login` when missing.
	///
	/// A missing identity with creation disabled is an error; the run never continues
	/// without a principal.
	pub async fn resolve_identity(&self, login: &LoginData) -> Result<ResolvedIdentity> {
		let key = EntityKey::Identity(self.config.username.clone());

		if let Some(identity) =
			<dyn CredentialStore>::find_as::<ServiceIdentity>(self.store.as_ref(), &key).await?
		{
			return Ok(ResolvedIdentity { identity, created: false });
		}
		if !self.config.create_identity {
			return Err(Error::IdentityCreation {
				reason: format!(
					"identity `{}` does not exist and creation is disabled",
					self.config.username
				),
			});
		}

		let password_hash = PasswordHash::hash(login.password()).map_err(|e| {
			Error::IdentityCreation { reason: format!("password could not be hashed: {e}") }
		})?;
		let created_at = OffsetDateTime::now_utc();
		let candidate = ServiceIdentity {
			id: None,
			username: self.config.username.clone(),
			first_name: self.config.first_name.clone(),
			last_name: self.config.last_name.clone(),
			email: self.config.identity_email(login.email()),
			password_hash: password_hash.clone(),
			role: None,
			is_active: true,
			created_at,
		};
		let identity = <dyn CredentialStore>::upsert_as(self.store.as_ref(), candidate)
			.await
			.map_err(|e| Error::IdentityCreation {
				reason: format!("identity could not be persisted: {e}"),
			})?;

		if identity.id.is_none() {
			return Err(Error::IdentityCreation {
				reason: "the store returned the identity without an id".into(),
			});
		}

		// Create-or-get hands back a concurrently created record instead of the candidate.
		let created = identity.created_at == created_at && identity.password_hash == password_hash;

		Ok(ResolvedIdentity { identity, created })
	}
}
