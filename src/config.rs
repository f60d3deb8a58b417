//! Connector configuration and its production defaults.
//!
//! [`ConnectorConfig::default`] carries the constants the connector ships with. Deployments
//! override individual values with the `with_*` setters or load a partial JSON document through
//! [`ConnectorConfig::from_json_slice`]; missing fields keep their defaults.

// std
use std::time::Duration;
// self
use crate::{
	_prelude::*,
	acl::{ResourceAttributeMap, ResourceTree},
	auth::{ConsumerName, RoleName, UserType, Username},
	error::ConfigError,
};

/// Username of the dedicated service identity.
pub const DEFAULT_USERNAME: &str = "StylaApiAdminUser";
/// Prefix prepended to the operator email to form the identity's email.
pub const DEFAULT_EMAIL_PREFIX: &str = "stylaapiadmin.";
/// Given name of the service identity.
pub const DEFAULT_FIRST_NAME: &str = "Styla";
/// Family name of the service identity.
pub const DEFAULT_LAST_NAME: &str = "Api Connector";
/// Name of the API role granted to the identity.
pub const DEFAULT_ROLE_NAME: &str = "StylaApi2Role";
/// Name of the OAuth consumer.
pub const DEFAULT_CONSUMER_NAME: &str = "Styla Api Connector";
/// ACL user type the grants apply to.
pub const DEFAULT_USER_TYPE: &str = "admin";
/// Production registration endpoint.
pub const DEFAULT_CONNECTION_URL: &str = "http://live.styla.com/api/magento";
/// Front name of the default binding.
pub const DEFAULT_FRONT_NAME: &str = "magazine";
/// Host ACL node list granted to the role.
pub const DEFAULT_ROLE_RESOURCES: &str = "__root__,group-catalog,resource-styla_category,privilege-styla_category-retrieve,resource-styla_product,privilege-styla_product-retrieve";
/// Registration request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_PRODUCT_ATTRIBUTES: &[&str] = &[
	"description",
	"entity_id",
	"image",
	"name",
	"price",
	"short_description",
	"sku",
	"status",
	"url_key",
	"visibility",
];
const DEFAULT_CATEGORY_ATTRIBUTES: &[&str] =
	&["entity_id", "image", "is_active", "name", "parent_id", "url_key"];

/// Settings that drive one connector instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
	/// Username of the service identity; the identity's idempotency key.
	pub username: Username,
	/// Prefix prepended to the operator email.
	pub email_prefix: String,
	/// Given name of a newly created identity.
	pub first_name: String,
	/// Family name of a newly created identity.
	pub last_name: String,
	/// Create the identity when it is missing; otherwise fail.
	pub create_identity: bool,
	/// API role assignment.
	pub role_name: RoleName,
	/// Resource tree granted to the role.
	pub role_resources: ResourceTree,
	/// ACL user type for attribute filters and token authorization.
	pub user_type: UserType,
	/// Readable fields per resource group.
	pub attributes: ResourceAttributeMap,
	/// OAuth consumer name.
	pub consumer_name: ConsumerName,
	/// Production registration endpoint.
	pub connection_url: Url,
	/// Honors caller-supplied endpoint overrides when `true`.
	pub developer_mode: bool,
	/// Front name of the default binding.
	pub front_name: String,
	/// Registration request timeout in seconds.
	pub request_timeout_secs: u64,
}
impl ConnectorConfig {
	/// Parses a (partial) JSON document, reporting the failing path on error.
	pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_slice(bytes);
		let config: Self = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ConfigError::Parse { source })?;

		config.validate()?;

		Ok(config)
	}

	/// Checks cross-field constraints the field types cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !matches!(self.connection_url.scheme(), "http" | "https")
			|| self.connection_url.host_str().is_none()
		{
			return Err(ConfigError::InvalidConnectionUrl {
				url: self.connection_url.to_string(),
				reason: "expected an absolute http(s) URL with a host".into(),
			});
		}
		if self.request_timeout_secs == 0 {
			return Err(ConfigError::InvalidValue {
				field: "request_timeout_secs",
				reason: "must be positive",
			});
		}
		if self.front_name.trim().is_empty() {
			return Err(ConfigError::InvalidValue { field: "front_name", reason: "cannot be empty" });
		}
		if self.email_prefix.chars().any(|c| c.is_whitespace() || c == '@') {
			return Err(ConfigError::InvalidValue {
				field: "email_prefix",
				reason: "cannot contain whitespace or `@`",
			});
		}

		Ok(())
	}

	/// Registration request timeout.
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	/// Email address of the service identity derived from the operator email.
	pub fn identity_email(&self, operator_email: &str) -> String {
		format!("{}{operator_email}", self.email_prefix)
	}

	/// Overrides the production registration endpoint.
	pub fn with_connection_url(mut self, url: Url) -> Self {
		self.connection_url = url;

		self
	}

	/// Enables or disables developer mode.
	pub fn with_developer_mode(mut self, enabled: bool) -> Self {
		self.developer_mode = enabled;

		self
	}

	/// Enables or disables identity creation.
	pub fn with_create_identity(mut self, enabled: bool) -> Self {
		self.create_identity = enabled;

		self
	}

	/// Replaces the resource → attribute map.
	pub fn with_attributes(mut self, attributes: ResourceAttributeMap) -> Self {
		self.attributes = attributes;

		self
	}

	/// Replaces the role resource tree.
	pub fn with_role_resources(mut self, resources: ResourceTree) -> Self {
		self.role_resources = resources;

		self
	}

	/// Overrides the default binding front name.
	pub fn with_front_name(mut self, front_name: impl Into<String>) -> Self {
		self.front_name = front_name.into();

		self
	}

	/// Overrides the registration timeout.
	pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
		self.request_timeout_secs = secs;

		self
	}
}
impl Default for ConnectorConfig {
	fn default() -> Self {
		Self {
			username: builtin(Username::new(DEFAULT_USERNAME)),
			email_prefix: DEFAULT_EMAIL_PREFIX.into(),
			first_name: DEFAULT_FIRST_NAME.into(),
			last_name: DEFAULT_LAST_NAME.into(),
			create_identity: true,
			role_name: builtin(RoleName::new(DEFAULT_ROLE_NAME)),
			role_resources: builtin(ResourceTree::parse(DEFAULT_ROLE_RESOURCES)),
			user_type: builtin(UserType::new(DEFAULT_USER_TYPE)),
			attributes: builtin(ResourceAttributeMap::new([
				("styla_product", DEFAULT_PRODUCT_ATTRIBUTES.iter().copied()),
				("styla_category", DEFAULT_CATEGORY_ATTRIBUTES.iter().copied()),
			])),
			consumer_name: builtin(ConsumerName::new(DEFAULT_CONSUMER_NAME)),
			connection_url: builtin(Url::parse(DEFAULT_CONNECTION_URL)),
			developer_mode: false,
			front_name: DEFAULT_FRONT_NAME.into(),
			request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
		}
	}
}

// Built-in constants are covered by `defaults_are_valid`.
fn builtin<T, E>(value: Result<T, E>) -> T
where
	E: Debug,
{
	match value {
		Ok(value) => value,
		Err(e) => unreachable!("built-in connector constant failed validation: {e:?}"),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_are_valid() {
		let config = ConnectorConfig::default();

		config.validate().expect("Default configuration should be valid.");

		assert_eq!(config.connection_url.as_str(), DEFAULT_CONNECTION_URL);
		assert_eq!(config.role_resources.to_string(), DEFAULT_ROLE_RESOURCES);
		assert_eq!(config.attributes.len(), 2);
		assert_eq!(config.request_timeout(), Duration::from_secs(30));
		assert!(!config.developer_mode);
		assert!(config.create_identity);
	}

	#[test]
	fn identity_email_is_prefixed() {
		let config = ConnectorConfig::default();

		assert_eq!(config.identity_email("ops@acme.test"), "stylaapiadmin.ops@acme.test");
	}

	#[test]
	fn partial_json_keeps_defaults() {
		let config = ConnectorConfig::from_json_slice(
			br#"{ "developer_mode": true, "front_name": "stories" }"#,
		)
		.expect("Partial configuration should parse.");

		assert!(config.developer_mode);
		assert_eq!(config.front_name, "stories");
		assert_eq!(config.role_name.as_ref(), DEFAULT_ROLE_NAME);
	}

	#[test]
	fn json_errors_report_the_failing_path() {
		let err = ConnectorConfig::from_json_slice(br#"{ "role_resources": "__root__,bogus" }"#)
			.expect_err("Unknown tree nodes must be rejected.");

		match err {
			ConfigError::Parse { source } => assert_eq!(source.path().to_string(), "role_resources"),
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn validation_rejects_unusable_values() {
		let ftp = ConnectorConfig::default()
			.with_connection_url(Url::parse("ftp://live.styla.com/").expect("URL should parse."));

		assert!(matches!(ftp.validate(), Err(ConfigError::InvalidConnectionUrl { .. })));
		assert!(matches!(
			ConnectorConfig::default().with_request_timeout_secs(0).validate(),
			Err(ConfigError::InvalidValue { field: "request_timeout_secs", .. })
		));
		assert!(matches!(
			ConnectorConfig::default().with_front_name(" ").validate(),
			Err(ConfigError::InvalidValue { field: "front_name", .. })
		));
	}
}
