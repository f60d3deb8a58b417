//! Secure secret wrapper that redacts sensitive material.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Length of generated consumer/token keys and secrets.
pub const GENERATED_SECRET_LEN: usize = 32;
const FINGERPRINT_LEN: usize = 12;

/// Redacted secret wrapper keeping passwords and OAuth secrets out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Generates a random lowercase alphanumeric secret of [`GENERATED_SECRET_LEN`] characters.
	pub fn generate() -> Self {
		Self(generate_token())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Short, stable digest that identifies the secret in logs without revealing it.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(self.0.as_bytes());
		let mut encoded = URL_SAFE_NO_PAD.encode(digest);

		encoded.truncate(FINGERPRINT_LEN);

		encoded
	}
}
impl AsRef<str> for Secret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Generates a random lowercase alphanumeric key of [`GENERATED_SECRET_LEN`] characters.
pub fn generate_token() -> String {
	rand::rng()
		.sample_iter(Alphanumeric)
		.take(GENERATED_SECRET_LEN)
		.map(|byte| char::from(byte).to_ascii_lowercase())
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = Secret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "Secret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn generated_secrets_are_lowercase_and_distinct() {
		let a = Secret::generate();
		let b = Secret::generate();

		assert_eq!(a.expose().len(), GENERATED_SECRET_LEN);
		assert!(a.expose().chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
		assert_ne!(a, b);
	}

	#[test]
	fn fingerprint_is_stable_and_does_not_leak() {
		let secret = Secret::new("super-secret");

		assert_eq!(secret.fingerprint(), Secret::new("super-secret").fingerprint());
		assert_eq!(secret.fingerprint().len(), FINGERPRINT_LEN);
		assert!(!secret.fingerprint().contains("super"));
	}
}
