//! Resource-tree parsing for role privilege requests.
//!
//! The host ACL posts the checked nodes of its resource tree as one comma-separated list, e.g.
//! `__root__,group-catalog,resource-styla_category,privilege-styla_category-retrieve`. Only
//! `privilege-<resource>-<privilege>` nodes grant anything; `resource-` nodes declare a resource
//! whose privileges are all unchecked, and `__root__`/`group-` nodes are structural.

// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	acl::Privilege,
	auth::{IdentifierError, RecordId, ResourceId, RoleName},
};

const ROOT_NODE: &str = "__root__";
const GROUP_PREFIX: &str = "group-";
const RESOURCE_PREFIX: &str = "resource-";
const PRIVILEGE_PREFIX: &str = "privilege-";

/// Errors raised while parsing a resource tree.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ResourceTreeError {
	/// A node does not match any known prefix.
	#[error("Unknown resource tree node `{node}`.")]
	UnknownNode {
		/// Offending node.
		node: String,
	},
	/// A privilege node names an unsupported privilege.
	#[error("Unknown privilege `{privilege}` in node `{node}`.")]
	UnknownPrivilege {
		/// Offending node.
		node: String,
		/// Privilege label that failed to parse.
		privilege: String,
	},
	/// A node carries an invalid resource name.
	#[error("Invalid resource in node `{node}`.")]
	InvalidResource {
		/// Offending node.
		node: String,
		/// Identifier validation failure.
		#[source]
		source: IdentifierError,
	},
	/// The tree grants no privilege at all.
	#[error("Resource tree grants no privileges.")]
	Empty,
}

/// Parsed resource tree: every declared resource with the privileges granted on it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceTree {
	groups: BTreeSet<String>,
	resources: BTreeMap<ResourceId, BTreeSet<Privilege>>,
}
impl ResourceTree {
	/// Parses a comma-separated node list.
	pub fn parse(raw: &str) -> Result<Self, ResourceTreeError> {
		let mut tree = Self::default();

		for node in raw.split(',').map(str::trim).filter(|node| !node.is_empty()) {
			if node == ROOT_NODE {
				continue;
			}
			if let Some(group) = node.strip_prefix(GROUP_PREFIX) {
				tree.groups.insert(group.to_owned());
			} else if let Some(resource) = node.strip_prefix(RESOURCE_PREFIX) {
				tree.resources.entry(parse_resource(node, resource)?).or_default();
			} else if let Some(rest) = node.strip_prefix(PRIVILEGE_PREFIX) {
				let (resource, privilege) = rest
					.rsplit_once('-')
					.ok_or_else(|| ResourceTreeError::UnknownNode { node: node.to_owned() })?;
				let privilege = privilege.parse::<Privilege>().map_err(|_| {
					ResourceTreeError::UnknownPrivilege {
						node: node.to_owned(),
						privilege: privilege.to_owned(),
					}
				})?;

				tree.resources.entry(parse_resource(node, resource)?).or_default().insert(privilege);
			} else {
				return Err(ResourceTreeError::UnknownNode { node: node.to_owned() });
			}
		}

		if tree.resources.values().all(BTreeSet::is_empty) {
			return Err(ResourceTreeError::Empty);
		}

		Ok(tree)
	}

	/// Iterates declared resources, including those with no granted privilege.
	pub fn resources(&self) -> impl Iterator<Item = &ResourceId> {
		self.resources.keys()
	}

	/// Privileges granted on `resource`.
	pub fn privileges(&self, resource: &ResourceId) -> Option<&BTreeSet<Privilege>> {
		self.resources.get(resource)
	}

	/// Returns `true` if the tree grants `privilege` on `resource`.
	pub fn allows(&self, resource: &ResourceId, privilege: Privilege) -> bool {
		self.resources.get(resource).is_some_and(|set| set.contains(&privilege))
	}

	/// Flattens the tree into `(resource, privilege)` pairs.
	pub fn grants(&self) -> impl Iterator<Item = (&ResourceId, Privilege)> {
		self.resources
			.iter()
			.flat_map(|(resource, privileges)| privileges.iter().map(move |p| (resource, *p)))
	}
}
impl Display for ResourceTree {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(ROOT_NODE)?;

		for group in &self.groups {
			write!(f, ",{GROUP_PREFIX}{group}")?;
		}
		for (resource, privileges) in &self.resources {
			write!(f, ",{RESOURCE_PREFIX}{resource}")?;

			for privilege in privileges {
				write!(f, ",{PRIVILEGE_PREFIX}{resource}-{privilege}")?;
			}
		}

		Ok(())
	}
}
impl FromStr for ResourceTree {
	type Err = ResourceTreeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl TryFrom<String> for ResourceTree {
	type Error = ResourceTreeError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}
impl From<ResourceTree> for String {
	fn from(value: ResourceTree) -> Self {
		value.to_string()
	}
}

/// Explicit role assignment handed from the permission assigner to the store layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleAssignmentRequest {
	/// Role to create or reuse.
	pub role_name: RoleName,
	/// Identities to add to the role.
	pub members: Vec<RecordId>,
	/// Privileges the role must hold.
	pub resources: ResourceTree,
}
impl RoleAssignmentRequest {
	/// Creates a request for `role_name` with the given privilege tree and no extra members.
	pub fn new(role_name: RoleName, resources: ResourceTree) -> Self {
		Self { role_name, members: Vec::new(), resources }
	}

	/// Adds a member to the request.
	pub fn with_member(mut self, member: RecordId) -> Self {
		if !self.members.contains(&member) {
			self.members.push(member);
		}

		self
	}
}

fn parse_resource(node: &str, resource: &str) -> Result<ResourceId, ResourceTreeError> {
	ResourceId::new(resource)
		.map_err(|source| ResourceTreeError::InvalidResource { node: node.to_owned(), source })
}
