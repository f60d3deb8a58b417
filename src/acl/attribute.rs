//! Attribute-filter rows and the declared resource → attribute map.

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, RecordId, ResourceId, UserType},
};

/// Operation an attribute filter applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	/// Read access; the only operation the connector grants.
	Read,
	/// Write access.
	Write,
}
impl Operation {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Read => "read",
			Operation::Write => "write",
		}
	}
}

/// Per-resource-group allow-list of readable fields for a user type and operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilter {
	/// Store-assigned id; `None` until persisted.
	pub id: Option<RecordId>,
	/// User type the filter applies to.
	pub user_type: UserType,
	/// Resource group.
	pub resource: ResourceId,
	/// Operation the filter applies to.
	pub operation: Operation,
	/// Field names visible through the API.
	pub allowed_attributes: Vec<String>,
}
impl AttributeFilter {
	/// Creates an unsaved read filter.
	pub fn read(user_type: UserType, resource: ResourceId, allowed_attributes: Vec<String>) -> Self {
		Self { id: None, user_type, resource, operation: Operation::Read, allowed_attributes }
	}

	/// Comma-separated attribute list, the form the host ACL stores.
	pub fn attributes_csv(&self) -> String {
		self.allowed_attributes.join(",")
	}
}

/// Errors raised while building a [`ResourceAttributeMap`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AttributeMapError {
	/// The map names no resource group.
	#[error("Attribute map must declare at least one resource group.")]
	Empty,
	/// A resource group has no attributes.
	#[error("Resource `{resource}` declares no attributes.")]
	NoAttributes {
		/// Offending resource.
		resource: String,
	},
	/// An attribute name is empty or contains a separator/whitespace.
	#[error("Resource `{resource}` declares invalid attribute `{attribute}`.")]
	InvalidAttribute {
		/// Offending resource.
		resource: String,
		/// Offending attribute.
		attribute: String,
	},
	/// The wildcard resource cannot be declared.
	#[error("The wildcard resource cannot be declared in an attribute map.")]
	Wildcard,
	/// A resource group name failed validation.
	#[error(transparent)]
	Resource(#[from] IdentifierError),
}

/// Mapping from resource group to the field names readable on it.
///
/// Attribute lists are sorted and deduplicated so repeated grants write identical rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<String>>", into = "BTreeMap<String, Vec<String>>")]
pub struct ResourceAttributeMap(BTreeMap<ResourceId, Vec<String>>);
impl ResourceAttributeMap {
	/// Validates and normalizes the provided groups.
	pub fn new<I, R, A, S>(groups: I) -> Result<Self, AttributeMapError>
	where
		I: IntoIterator<Item = (R, A)>,
		R: AsRef<str>,
		A: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut map = BTreeMap::new();

		for (resource, attributes) in groups {
			let resource = ResourceId::new(resource)?;

			if resource.is_wildcard() {
				return Err(AttributeMapError::Wildcard);
			}

			let mut attributes = attributes.into_iter().map(Into::into).collect::<Vec<String>>();

			if let Some(bad) = attributes
				.iter()
				.find(|a| a.is_empty() || a.contains(',') || a.chars().any(char::is_whitespace))
			{
				return Err(AttributeMapError::InvalidAttribute {
					resource: resource.to_string(),
					attribute: bad.clone(),
				});
			}

			attributes.sort();
			attributes.dedup();

			if attributes.is_empty() {
				return Err(AttributeMapError::NoAttributes { resource: resource.to_string() });
			}

			map.entry(resource).or_insert_with(Vec::new).extend(attributes);
		}

		if map.is_empty() {
			return Err(AttributeMapError::Empty);
		}

		for attributes in map.values_mut() {
			attributes.sort();
			attributes.dedup();
		}

		Ok(Self(map))
	}

	/// Returns `true` if the map declares `resource`.
	pub fn contains(&self, resource: &ResourceId) -> bool {
		self.0.contains_key(resource)
	}

	/// Iterates declared groups.
	pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &[String])> {
		self.0.iter().map(|(resource, attributes)| (resource, attributes.as_slice()))
	}

	/// Number of declared groups.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Always `false` for a validated map.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl TryFrom<BTreeMap<String, Vec<String>>> for ResourceAttributeMap {
	type Error = AttributeMapError;

	fn try_from(value: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<ResourceAttributeMap> for BTreeMap<String, Vec<String>> {
	fn from(value: ResourceAttributeMap) -> Self {
		value.0.into_iter().map(|(resource, attributes)| (resource.into(), attributes)).collect()
	}
}
