//! Credential store contract and built-in store implementations.
//!
//! Every persisted record is an [`Entity`] addressed by a unique [`EntityKey`]. Upserts are
//! atomic per store: an entity without an id is a create intent and returns the existing record
//! untouched when its unique key is already taken, while an entity with an id replaces the
//! stored record. Attribute-filter rows have no natural key and are addressed by id only.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	acl::{AttributeFilter, Privilege, Role, RoleRule},
	auth::{Consumer, ConsumerName, RecordId, ResourceId, RoleName, ServiceIdentity, Token, Username},
};

/// Boxed future returned by [`CredentialStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for identities, roles, consumers, tokens, and ACL rows.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the entity stored under `key`, if any.
	fn find<'a>(&'a self, key: &'a EntityKey) -> StoreFuture<'a, Option<Entity>>;

	/// Creates or updates `entity` and returns the stored record.
	fn upsert(&self, entity: Entity) -> StoreFuture<'_, Entity>;

	/// Removes the entity stored under `key`, returning it.
	fn delete<'a>(&'a self, key: &'a EntityKey) -> StoreFuture<'a, Option<Entity>>;

	/// Lists every entity of `kind`, ordered by id.
	fn list(&self, kind: EntityKind) -> StoreFuture<'_, Vec<Entity>>;
}
impl dyn CredentialStore {
	/// Typed [`CredentialStore::find`].
	pub async fn find_as<T>(&self, key: &EntityKey) -> Result<Option<T>, StoreError>
	where
		T: StoredEntity,
	{
		self.find(key).await?.map(T::from_entity).transpose()
	}

	/// Typed [`CredentialStore::upsert`].
	pub async fn upsert_as<T>(&self, value: T) -> Result<T, StoreError>
	where
		T: StoredEntity,
	{
		T::from_entity(self.upsert(value.into_entity()).await?)
	}

	/// Typed [`CredentialStore::list`].
	pub async fn list_as<T>(&self) -> Result<Vec<T>, StoreError>
	where
		T: StoredEntity,
	{
		self.list(T::KIND).await?.into_iter().map(T::from_entity).collect()
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// An update would move a record onto a unique key held by another record.
	#[error("The {kind} key `{key}` is held by another record.")]
	UniqueViolation {
		/// Kind label of the conflicting records.
		kind: &'static str,
		/// Debug rendering of the contested key.
		key: String,
	},
	/// The backend returned an entity of another kind than requested.
	#[error("Expected a {expected} record but found a {found} record.")]
	KindMismatch {
		/// Requested kind label.
		expected: &'static str,
		/// Returned kind label.
		found: &'static str,
	},
}

/// Kinds of persisted records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
	/// [`ServiceIdentity`] records.
	Identity,
	/// [`Role`] records.
	Role,
	/// [`RoleRule`] rows.
	RoleRule,
	/// [`Consumer`] records.
	Consumer,
	/// [`Token`] records.
	Token,
	/// [`AttributeFilter`] rows.
	AttributeFilter,
}
impl EntityKind {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			EntityKind::Identity => "identity",
			EntityKind::Role => "role",
			EntityKind::RoleRule => "role_rule",
			EntityKind::Consumer => "consumer",
			EntityKind::Token => "token",
			EntityKind::AttributeFilter => "attribute_filter",
		}
	}
}

/// Unique key of a stored entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKey {
	/// Identity by username.
	Identity(Username),
	/// Role by name.
	Role(RoleName),
	/// Rule row by its `(role, resource, privilege)` triple.
	RoleRule {
		/// Owning role.
		role: RecordId,
		/// Resource the rule applies to.
		resource: ResourceId,
		/// Granted privilege.
		privilege: Privilege,
	},
	/// Consumer by name.
	Consumer(ConsumerName),
	/// The token of a consumer (one per consumer).
	Token(RecordId),
	/// Attribute-filter row by id.
	AttributeFilter(RecordId),
}
impl EntityKey {
	/// Kind addressed by the key.
	pub const fn kind(&self) -> EntityKind {
		match self {
			EntityKey::Identity(_) => EntityKind::Identity,
			EntityKey::Role(_) => EntityKind::Role,
			EntityKey::RoleRule { .. } => EntityKind::RoleRule,
			EntityKey::Consumer(_) => EntityKind::Consumer,
			EntityKey::Token(_) => EntityKind::Token,
			EntityKey::AttributeFilter(_) => EntityKind::AttributeFilter,
		}
	}
}

/// Any record persisted by a [`CredentialStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum Entity {
	/// Service identity.
	Identity(ServiceIdentity),
	/// API role.
	Role(Role),
	/// Role rule row.
	RoleRule(RoleRule),
	/// OAuth consumer.
	Consumer(Consumer),
	/// OAuth token.
	Token(Token),
	/// Attribute-filter row.
	AttributeFilter(AttributeFilter),
}
impl Entity {
	/// Kind of the entity.
	pub const fn kind(&self) -> EntityKind {
		match self {
			Entity::Identity(_) => EntityKind::Identity,
			Entity::Role(_) => EntityKind::Role,
			Entity::RoleRule(_) => EntityKind::RoleRule,
			Entity::Consumer(_) => EntityKind::Consumer,
			Entity::Token(_) => EntityKind::Token,
			Entity::AttributeFilter(_) => EntityKind::AttributeFilter,
		}
	}

	/// Store-assigned id, if persisted.
	pub fn id(&self) -> Option<RecordId> {
		match self {
			Entity::Identity(v) => v.id,
			Entity::Role(v) => v.id,
			Entity::RoleRule(v) => v.id,
			Entity::Consumer(v) => v.id,
			Entity::Token(v) => v.id,
			Entity::AttributeFilter(v) => v.id,
		}
	}

	/// Assigns the store id.
	pub fn set_id(&mut self, id: RecordId) {
		let slot = match self {
			Entity::Identity(v) => &mut v.id,
			Entity::Role(v) => &mut v.id,
			Entity::RoleRule(v) => &mut v.id,
			Entity::Consumer(v) => &mut v.id,
			Entity::Token(v) => &mut v.id,
			Entity::AttributeFilter(v) => &mut v.id,
		};

		*slot = Some(id);
	}

	/// Unique key of the entity; `None` for an unsaved attribute-filter row.
	pub fn unique_key(&self) -> Option<EntityKey> {
		match self {
			Entity::Identity(v) => Some(EntityKey::Identity(v.username.clone())),
			Entity::Role(v) => Some(EntityKey::Role(v.name.clone())),
			Entity::RoleRule(v) => Some(EntityKey::RoleRule {
				role: v.role,
				resource: v.resource.clone(),
				privilege: v.privilege,
			}),
			Entity::Consumer(v) => Some(EntityKey::Consumer(v.name.clone())),
			Entity::Token(v) => Some(EntityKey::Token(v.consumer)),
			Entity::AttributeFilter(v) => v.id.map(EntityKey::AttributeFilter),
		}
	}
}

/// Typed view over one [`Entity`] variant.
pub trait StoredEntity
where
	Self: Sized + Send,
{
	/// Kind stored by the type.
	const KIND: EntityKind;

	/// Wraps the value.
	fn into_entity(self) -> Entity;

	/// Unwraps the value, failing on another variant.
	fn from_entity(entity: Entity) -> Result<Self, StoreError>;
}

macro_rules! impl_stored_entity {
	($ty:ty, $variant:ident) => {
		impl StoredEntity for $ty {
			const KIND: EntityKind = EntityKind::$variant;

			fn into_entity(self) -> Entity {
				Entity::$variant(self)
			}

			fn from_entity(entity: Entity) -> Result<Self, StoreError> {
				match entity {
					Entity::$variant(value) => Ok(value),
					other => Err(StoreError::KindMismatch {
						expected: Self::KIND.as_str(),
						found: other.kind().as_str(),
					}),
				}
			}
		}
		impl From<$ty> for Entity {
			fn from(value: $ty) -> Self {
				Entity::$variant(value)
			}
		}
	};
}

impl_stored_entity!(ServiceIdentity, Identity);
impl_stored_entity!(Role, Role);
impl_stored_entity!(RoleRule, RoleRule);
impl_stored_entity!(Consumer, Consumer);
impl_stored_entity!(Token, Token);
impl_stored_entity!(AttributeFilter, AttributeFilter);
