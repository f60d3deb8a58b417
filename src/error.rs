//! Connector-level error types shared across provisioning, registration, and stores.

// self
use crate::{
	_prelude::*,
	acl::{AttributeMapError, ResourceTreeError},
	auth::{IdentifierError, LoginDataError, TokenStateError},
};

/// Connector-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical connector error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Remote registration failed.
	#[error(transparent)]
	Registration(#[from] RegistrationError),
	/// Operator login data failed validation.
	#[error(transparent)]
	InvalidLogin(#[from] LoginDataError),
	/// A token lifecycle transition was rejected.
	#[error(transparent)]
	TokenState(#[from] TokenStateError),

	/// The service identity is missing and could not be created.
	#[error("Service identity could not be provisioned: {reason}.")]
	IdentityCreation {
		/// Human-readable cause.
		reason: String,
	},
	/// The downstream binding registry refused the default binding.
	#[error("Default binding could not be created: {message}.")]
	Binding {
		/// Registry-supplied message.
		message: String,
	},
}

/// Configuration and validation failures raised by the connector.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The registration endpoint is not an absolute `http`/`https` URL with a host.
	#[error("Connection URL `{url}` is invalid: {reason}.")]
	InvalidConnectionUrl {
		/// Rejected URL text.
		url: String,
		/// Why the URL was rejected.
		reason: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The role resource tree cannot be parsed.
	#[error("Role resource tree is invalid.")]
	InvalidResourceTree(#[from] ResourceTreeError),
	/// The resource → attribute map is invalid.
	#[error("Resource attribute map is invalid.")]
	InvalidAttributes(#[from] AttributeMapError),
	/// A configured identifier failed validation.
	#[error("Configured identifier is invalid.")]
	Identifier(#[from] IdentifierError),
	/// A configured value is out of range.
	#[error("Configuration value `{field}` is invalid: {reason}.")]
	InvalidValue {
		/// Offending field.
		field: &'static str,
		/// Why the value was rejected.
		reason: &'static str,
	},
	/// The configuration document could not be parsed.
	#[error("Configuration document is malformed.")]
	Parse {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Remote registration failures.
#[derive(Debug, ThisError)]
pub enum RegistrationError {
	/// The remote API answered with a non-success status.
	#[error(
		"Couldn't connect to Styla API. Error result: {status}{}. Please check the email and password used and try connecting one more time.",
		rejection_detail(.message)
	)]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Server-supplied error text, or a short plain-text body; `None` when neither exists.
		message: Option<String>,
	},
	/// The remote API answered with a body that is not a client configuration.
	#[error(
		"Couldn't connect to Styla API. Error result: {status} - malformed response. Please check the email and password used and try connecting one more time."
	)]
	MalformedResponse {
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The request never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl RegistrationError {
	/// HTTP status code of the remote answer, when one arrived.
	pub fn status(&self) -> Option<u16> {
		match self {
			RegistrationError::Rejected { status, .. }
			| RegistrationError::MalformedResponse { status, .. } => Some(*status),
			RegistrationError::Transport(_) => None,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the registration endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Registration endpoint did not answer in time.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the registration endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

fn rejection_detail(message: &Option<String>) -> String {
	message.as_deref().map(|m| format!(" - {m}")).unwrap_or_default()
}
