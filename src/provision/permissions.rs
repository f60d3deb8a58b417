//! Role assignment and attribute-filter grants for the service identity.
//!
//! Both operations converge instead of accumulating: after a grant the filter rows of the
//! declared resource groups are exactly the declared set, and after an assignment the role's
//! rules on the tree's resources are exactly the declared privileges.

// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	acl::{AttributeFilter, ResourceAttributeMap, Role, RoleAssignmentRequest, RoleRule},
	auth::{RecordId, ServiceIdentity, UserType},
	store::{CredentialStore, EntityKey, StoreError},
};

/// Result of [`PermissionAssigner::grant_read_access`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantOutcome {
	/// A wildcard grant already covers every resource; nothing was written.
	WildcardPresent,
	/// Filter rows were reset to the declared set.
	Applied {
		/// Rows deleted before inserting.
		removed: usize,
		/// Rows inserted.
		inserted: usize,
	},
}

/// Result of [`PermissionAssigner::assign_role`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleAssignment {
	/// Persisted role.
	pub role: Role,
	/// `true` when the role did not exist before.
	pub role_created: bool,
	/// Rules reused by id.
	pub kept_rules: usize,
	/// Rules inserted.
	pub inserted_rules: usize,
	/// Undeclared rules deleted.
	pub removed_rules: usize,
}

/// Grants the service identity its API role and readable attributes.
#[derive(Clone)]
pub struct PermissionAssigner {
	store: Arc<dyn CredentialStore>,
	user_type: UserType,
}
impl PermissionAssigner {
	/// Creates an assigner writing rows for `user_type`.
	pub fn new(store: Arc<dyn CredentialStore>, user_type: UserType) -> Self {
		Self { store, user_type }
	}

	/// Resets the attribute-filter rows of the map's resource groups to the declared lists.
	///
	/// Returns [`GrantOutcome::WildcardPresent`] without writing when a wildcard filter exists
	/// for the user type or the identity's role holds a rule on the wildcard resource.
	pub async fn grant_read_access(
		&self,
		identity: &ServiceIdentity,
		attributes: &ResourceAttributeMap,
	) -> Result<GrantOutcome> {
		let filters = self.store.list_as::<AttributeFilter>().await?;

		if filters.iter().any(|f| f.user_type == self.user_type && f.resource.is_wildcard())
			|| self.role_has_wildcard(identity.role).await?
		{
			return Ok(GrantOutcome::WildcardPresent);
		}

		let mut removed = 0;

		for id in filters
			.iter()
			.filter(|f| f.user_type == self.user_type && attributes.contains(&f.resource))
			.filter_map(|f| f.id)
		{
			if self.store.delete(&EntityKey::AttributeFilter(id)).await?.is_some() {
				removed += 1;
			}
		}

		let mut inserted = 0;

		for (resource, allowed) in attributes.iter() {
			let row =
				AttributeFilter::read(self.user_type.clone(), resource.clone(), allowed.to_vec());

			self.store.upsert_as(row).await?;

			inserted += 1;
		}

		Ok(GrantOutcome::Applied { removed, inserted })
	}

	/// Creates or reuses the requested role, adds the identity to it, and converges its rules.
	pub async fn assign_role(
		&self,
		identity: &mut ServiceIdentity,
		request: &RoleAssignmentRequest,
	) -> Result<RoleAssignment> {
		let identity_id = identity.id.ok_or_else(|| Error::IdentityCreation {
			reason: format!("identity `{}` is not persisted", identity.username),
		})?;
		let key = EntityKey::Role(request.role_name.clone());
		let (mut role, role_created) = match self.store.find_as::<Role>(&key).await? {
			Some(role) => (role, false),
			None => (self.store.upsert_as(Role::new(request.role_name.clone())).await?, true),
		};
		let role_id = role.id.ok_or_else(|| StoreError::Backend {
			message: format!("role `{}` was stored without an id", request.role_name),
		})?;
		let members =
			request.members.iter().copied().chain([identity_id]).collect::<BTreeSet<_>>();

		if !members.is_subset(&role.members) {
			role.members.extend(members);
			role = self.store.upsert_as(role).await?;
		}
		if identity.role != Some(role_id) {
			identity.role = Some(role_id);
			*identity = self.store.upsert_as(identity.clone()).await?;
		}

		let mut kept_rules = 0;
		let mut removed_rules = 0;

		for rule in self.store.list_as::<RoleRule>().await?.into_iter().filter(|rule| {
			rule.role == role_id && request.resources.privileges(&rule.resource).is_some()
		}) {
			if request.resources.allows(&rule.resource, rule.privilege) {
				kept_rules += 1;

				continue;
			}

			let key = EntityKey::RoleRule {
				role: role_id,
				resource: rule.resource.clone(),
				privilege: rule.privilege,
			};

			if self.store.delete(&key).await?.is_some() {
				removed_rules += 1;
			}
		}

		let mut inserted_rules = 0;

		for (resource, privilege) in request.resources.grants() {
			let key = EntityKey::RoleRule { role: role_id, resource: resource.clone(), privilege };

			if self.store.find(&key).await?.is_none() {
				self.store.upsert_as(RoleRule::new(role_id, resource.clone(), privilege)).await?;

				inserted_rules += 1;
			}
		}

		Ok(RoleAssignment { role, role_created, kept_rules, inserted_rules, removed_rules })
	}

	async fn role_has_wildcard(&self, role: Option<RecordId>) -> Result<bool> {
		let Some(role) = role else {
			return Ok(false);
		};

		Ok(self
			.store
			.list_as::<RoleRule>()
			.await?
			.iter()
			.any(|rule| rule.role == role && rule.resource.is_wildcard()))
	}
}
impl Debug for PermissionAssigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PermissionAssigner").field("user_type", &self.user_type).finish()
	}
}
