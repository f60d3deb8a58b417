//! Registration client that hands the provisioned credentials to the remote API.
//!
//! One POST per call, no retries. The endpoint is the configured production URL unless
//! developer mode is on and the caller supplies an override.

// self
use crate::{
	_prelude::*,
	auth::{Consumer, LoginData, Token},
	config::ConnectorConfig,
	error::{ConfigError, RegistrationError},
	http::{RegistrationTransport, TransportResponse},
};

/// Client configuration returned by the remote API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegistrationResult {
	/// Remote client (account) name, when assigned.
	pub client: Option<String>,
	/// Remaining configuration fields, verbatim.
	pub config: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawRegistration {
	#[serde(default)]
	client: Option<String>,
	#[serde(flatten)]
	config: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawRejection {
	error: String,
}

const MAX_REJECTION_TEXT: usize = 200;

/// Posts credentials to the registration endpoint through a [`RegistrationTransport`].
pub struct RegistrationClient<T>
where
	T: ?Sized + RegistrationTransport,
{
	transport: Arc<T>,
	production_url: Url,
	developer_mode: bool,
}
impl<T> RegistrationClient<T>
where
	T: ?Sized + RegistrationTransport,
{
	/// Builds a client from the connector configuration.
	pub fn new(transport: Arc<T>, config: &ConnectorConfig) -> Self {
		Self {
			transport,
			production_url: config.connection_url.clone(),
			developer_mode: config.developer_mode,
		}
	}

	/// Returns the shared transport.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Picks the endpoint for this call.
	///
	/// The override is honored only in developer mode and must be an absolute `http`/`https`
	/// URL with a host; otherwise the production URL is used. A blank override counts as absent.
	pub fn resolve_endpoint(&self, override_url: Option<&str>) -> Result<Url, ConfigError> {
		match override_url.map(str::trim).filter(|raw| !raw.is_empty()) {
			Some(raw) if self.developer_mode => parse_endpoint(raw),
			_ => Ok(self.production_url.clone()),
		}
	}

	/// Registers the consumer/token pair on behalf of the operator.
	pub async fn register(
		&self,
		login: &LoginData,
		consumer: &Consumer,
		token: &Token,
		endpoint: &Url,
	) -> Result<RegistrationResult, RegistrationError> {
		let form = [
			("styla_email", login.email().to_owned()),
			("styla_password", login.password().expose().to_owned()),
			("consumer_key", consumer.key.clone()),
			("consumer_secret", consumer.secret.expose().to_owned()),
			("token_key", token.key.clone()),
			("token_secret", token.secret.expose().to_owned()),
		];
		let response = self.transport.post_form(endpoint, &form).await?;

		parse_response(response)
	}
}
impl<T> Clone for RegistrationClient<T>
where
	T: ?Sized + RegistrationTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: Arc::clone(&self.transport),
			production_url: self.production_url.clone(),
			developer_mode: self.developer_mode,
		}
	}
}
impl<T> Debug for RegistrationClient<T>
where
	T: ?Sized + RegistrationTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RegistrationClient")
			.field("production_url", &self.production_url.as_str())
			.field("developer_mode", &self.developer_mode)
			.finish()
	}
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
	let invalid = |reason: &str| ConfigError::InvalidConnectionUrl {
		url: raw.to_owned(),
		reason: reason.to_owned(),
	};
	let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;

	if !matches!(url.scheme(), "http" | "https") {
		return Err(invalid("expected an http or https scheme"));
	}
	if url.host_str().is_none_or(str::is_empty) {
		return Err(invalid("missing host"));
	}

	Ok(url)
}

fn parse_response(response: TransportResponse) -> Result<RegistrationResult, RegistrationError> {
	if !response.is_success() {
		return Err(RegistrationError::Rejected {
			status: response.status,
			message: rejection_message(&response.body),
		});
	}

	let TransportResponse { status, body } = response;
	let mut deserializer = serde_json::Deserializer::from_slice(&body);
	let raw: RawRegistration = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| RegistrationError::MalformedResponse { status, source })?;

	Ok(RegistrationResult { client: raw.client.filter(|c| !c.is_empty()), config: raw.config })
}

// JSON `error` text wins; otherwise a short plain-text body is kept and markup is dropped.
fn rejection_message(body: &[u8]) -> Option<String> {
	if let Ok(rejection) = serde_json::from_slice::<RawRejection>(body) {
		let error = rejection.error.trim();

		return (!error.is_empty()).then(|| error.to_owned());
	}

	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	if text.is_empty() || text.starts_with('<') {
		return None;
	}
	if text.chars().count() > MAX_REJECTION_TEXT {
		let cut = text.chars().take(MAX_REJECTION_TEXT).collect::<String>();

		return Some(format!("{}...", cut.trim_end()));
	}

	Some(text.to_owned())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> TransportResponse {
		TransportResponse { status, body: body.as_bytes().to_vec() }
	}

	#[test]
	fn success_splits_client_from_config() {
		let result = parse_response(response(200, r#"{"client":"acme","feed":"v2","depth":3}"#))
			.expect("Success payload should parse.");

		assert_eq!(result.client.as_deref(), Some("acme"));
		assert_eq!(result.config.len(), 2);
		assert_eq!(result.config.get("feed"), Some(&serde_json::json!("v2")));
		assert!(!result.config.contains_key("client"));
	}

	#[test]
	fn success_without_client_is_accepted() {
		let result = parse_response(response(201, r#"{"feed":"v2"}"#))
			.expect("Payload without client should parse.");

		assert_eq!(result.client, None);
	}

	#[test]
	fn rejection_prefers_the_error_field() {
		let err = parse_response(response(401, r#"{"error":"Wrong credentials"}"#))
			.expect_err("401 must be rejected.");

		assert!(matches!(
			err,
			RegistrationError::Rejected { status: 401, ref message }
				if message.as_deref() == Some("Wrong credentials")
		));

		let err = parse_response(response(502, "Bad Gateway\n")).expect_err("502 must be rejected.");

		assert!(matches!(
			err,
			RegistrationError::Rejected { status: 502, ref message }
				if message.as_deref() == Some("Bad Gateway")
		));
	}

	#[test]
	fn rejection_without_usable_text_has_no_message() {
		for body in ["", "  \n", r#"{"error":""}"#, "<html><body>Internal Server Error</body></html>"] {
			let err = parse_response(response(500, body)).expect_err("500 must be rejected.");

			assert!(
				matches!(err, RegistrationError::Rejected { status: 500, message: None }),
				"{body:?} should yield no message"
			);
			assert!(err.to_string().contains("Error result: 500. Please check"));
		}
	}

	#[test]
	fn long_plain_text_rejection_is_capped() {
		let body = "x".repeat(MAX_REJECTION_TEXT * 3);
		let err = parse_response(response(503, &body)).expect_err("503 must be rejected.");
		let RegistrationError::Rejected { message: Some(message), .. } = err else {
			panic!("Plain-text body should be kept.");
		};

		assert_eq!(message.chars().count(), MAX_REJECTION_TEXT + 3);
		assert!(message.ends_with("..."));
	}

	#[test]
	fn malformed_success_reports_the_path() {
		let err = parse_response(response(200, r#"{"client":42}"#))
			.expect_err("Numeric client must be rejected.");

		match err {
			RegistrationError::MalformedResponse { status, source } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "client");
			},
			other => panic!("Unexpected error: {other:?}"),
		}
		assert!(matches!(
			parse_response(response(200, "[1,2]")),
			Err(RegistrationError::MalformedResponse { .. })
		));
	}

	#[test]
	fn endpoint_validation() {
		assert!(parse_endpoint("https://staging.styla.test/api/magento").is_ok());

		for raw in ["not a url", "ftp://staging.styla.test/", "mailto:ops@acme.test", "/api/magento"]
		{
			assert!(
				matches!(parse_endpoint(raw), Err(ConfigError::InvalidConnectionUrl { .. })),
				"{raw} should be rejected"
			);
		}
	}
}
