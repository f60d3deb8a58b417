//! Service identity records, operator login data, and password hashing.

// crates.io
use argon2::{
	Argon2,
	password_hash::{self, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
// self
use crate::{
	_prelude::*,
	auth::{RecordId, Secret, Username},
};

/// Errors raised while validating operator login data.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum LoginDataError {
	/// The email address is empty or not of the form `local@domain`.
	#[error("The email address `{email}` is invalid.")]
	InvalidEmail {
		/// Rejected email address.
		email: String,
	},
	/// The password is empty.
	#[error("The password cannot be empty.")]
	EmptyPassword,
}

/// Operator credentials entered in the connect form.
///
/// The same pair is forwarded to the remote API and seeds the service identity.
#[derive(Clone, Debug)]
pub struct LoginData {
	email: String,
	password: Secret,
}
impl LoginData {
	/// Validates and wraps the operator's email and password.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, LoginDataError> {
		let email = email.into().trim().to_owned();
		let password = password.into();

		if !is_plausible_email(&email) {
			return Err(LoginDataError::InvalidEmail { email });
		}
		if password.is_empty() {
			return Err(LoginDataError::EmptyPassword);
		}

		Ok(Self { email, password: Secret::new(password) })
	}

	/// Operator email address.
	pub fn email(&self) -> &str {
		&self.email
	}

	/// Operator password.
	pub fn password(&self) -> &Secret {
		&self.password
	}
}

/// Argon2 PHC string of a service identity password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);
impl PasswordHash {
	/// Hashes `password` with a fresh random salt.
	pub fn hash(password: &Secret) -> Result<Self, password_hash::Error> {
		let salt = SaltString::generate(&mut OsRng);
		let phc = Argon2::default().hash_password(password.expose().as_bytes(), &salt)?;

		Ok(Self(phc.to_string()))
	}

	/// Returns `true` when `password` matches the stored hash.
	pub fn verify(&self, password: &Secret) -> bool {
		password_hash::PasswordHash::new(&self.0)
			.map(|parsed| {
				Argon2::default().verify_password(password.expose().as_bytes(), &parsed).is_ok()
			})
			.unwrap_or(false)
	}

	/// Returns the PHC string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Debug for PasswordHash {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PasswordHash(..)")
	}
}

/// Dedicated, non-human account that authenticates the integration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
	/// Store-assigned id; `None` until persisted.
	pub id: Option<RecordId>,
	/// Unique login name; the idempotency key.
	pub username: Username,
	/// Given name shown in the admin user grid.
	pub first_name: String,
	/// Family name shown in the admin user grid.
	pub last_name: String,
	/// Contact email, derived from the operator's email.
	pub email: String,
	/// Hashed password.
	pub password_hash: PasswordHash,
	/// API role the identity belongs to, once assigned.
	pub role: Option<RecordId>,
	/// Inactive identities cannot authorize tokens.
	pub is_active: bool,
	/// Creation instant.
	pub created_at: OffsetDateTime,
}
impl ServiceIdentity {
	/// Returns `true` when the identity is persisted and allowed to authorize tokens.
	pub fn is_valid_principal(&self) -> bool {
		self.id.is_some() && self.is_active
	}
}

fn is_plausible_email(email: &str) -> bool {
	match email.split_once('@') {
		Some((local, domain)) =>
			!local.is_empty()
				&& !domain.is_empty()
				&& !domain.starts_with('.')
				&& !domain.ends_with('.')
				&& !domain.contains('@')
				&& !email.chars().any(char::is_whitespace),
		None => false,
	}
}
