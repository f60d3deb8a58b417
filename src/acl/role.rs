//! API roles and their privilege rule rows.

// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	auth::{RecordId, ResourceId, RoleName},
};

/// Privilege a role rule grants on a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
	/// Create new entries.
	Create,
	/// Read entries.
	Retrieve,
	/// Modify entries.
	Update,
	/// Remove entries.
	Delete,
}
impl Privilege {
	/// Returns the label used in resource trees and rule rows.
	pub const fn as_str(self) -> &'static str {
		match self {
			Privilege::Create => "create",
			Privilege::Retrieve => "retrieve",
			Privilege::Update => "update",
			Privilege::Delete => "delete",
		}
	}
}
impl Display for Privilege {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Privilege {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"create" => Ok(Privilege::Create),
			"retrieve" => Ok(Privilege::Retrieve),
			"update" => Ok(Privilege::Update),
			"delete" => Ok(Privilege::Delete),
			other => Err(other.to_owned()),
		}
	}
}

/// Named API role with its member identities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
	/// Store-assigned id; `None` until persisted.
	pub id: Option<RecordId>,
	/// Unique role name.
	pub name: RoleName,
	/// Identities assigned to the role.
	pub members: BTreeSet<RecordId>,
	/// Creation instant.
	pub created_at: OffsetDateTime,
}
impl Role {
	/// Creates an unsaved role without members.
	pub fn new(name: RoleName) -> Self {
		Self { id: None, name, members: BTreeSet::new(), created_at: OffsetDateTime::now_utc() }
	}
}

/// One `(role, resource, privilege)` grant row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
	/// Store-assigned id; `None` until persisted.
	pub id: Option<RecordId>,
	/// Owning role.
	pub role: RecordId,
	/// Resource the rule applies to.
	pub resource: ResourceId,
	/// Granted privilege.
	pub privilege: Privilege,
}
impl RoleRule {
	/// Creates an unsaved rule row.
	pub fn new(role: RecordId, resource: ResourceId, privilege: Privilege) -> Self {
		Self { id: None, role, resource, privilege }
	}
}
