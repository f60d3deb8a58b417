//! Transport primitives for the outbound registration call.
//!
//! [`RegistrationTransport`] is the connector's only dependency on an HTTP stack. It posts one
//! url-encoded form and hands back the raw status and body; status interpretation and body
//! parsing stay in [`crate::registration`] so custom transports only move bytes.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`RegistrationTransport::post_form`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Raw answer of the registration endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Abstraction over HTTP transports capable of posting the registration form.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared across
/// connector instances, and must bound every request by a timeout.
pub trait RegistrationTransport
where
	Self: 'static + Send + Sync,
{
	/// Posts `form` as `application/x-www-form-urlencoded` to `url`.
	fn post_form<'a>(
		&'a self,
		url: &'a Url,
		form: &'a [(&'static str, String)],
	) -> TransportFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Registration answers arrive directly; configure any custom [`ReqwestClient`] with a request
/// timeout because the connector performs no retries of its own.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a client whose requests time out after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, crate::error::ConfigError> {
		Ok(Self(ReqwestClient::builder().timeout(timeout).build()?))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl RegistrationTransport for ReqwestTransport {
	fn post_form<'a>(
		&'a self,
		url: &'a Url,
		form: &'a [(&'static str, String)],
	) -> TransportFuture<'a> {
		Box::pin(async move {
			let response = self.0.post(url.clone()).form(form).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(TransportResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn success_covers_the_2xx_range() {
		let response = |status| TransportResponse { status, body: Vec::new() };

		assert!(response(200).is_success());
		assert!(response(204).is_success());
		assert!(!response(302).is_success());
		assert!(!response(401).is_success());
	}
}
