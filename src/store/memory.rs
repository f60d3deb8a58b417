//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::RecordId,
	store::{CredentialStore, Entity, EntityKey, EntityKind, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<Tables>>;

/// Thread-safe storage backend that keeps records in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of records of `kind` currently stored.
	pub fn count(&self, kind: EntityKind) -> usize {
		self.0.read().rows.values().filter(|entity| entity.kind() == kind).count()
	}

	/// Total number of successful mutations (inserts, updates, deletes) applied so far.
	pub fn mutations(&self) -> u64 {
		self.0.read().mutations
	}
}
impl CredentialStore for MemoryStore {
	fn find<'a>(&'a self, key: &'a EntityKey) -> StoreFuture<'a, Option<Entity>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().find(key)) })
	}

	fn upsert(&self, entity: Entity) -> StoreFuture<'_, Entity> {
		let map = self.0.clone();

		Box::pin(async move { map.write().upsert(entity) })
	}

	fn delete<'a>(&'a self, key: &'a EntityKey) -> StoreFuture<'a, Option<Entity>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().delete(key)) })
	}

	fn list(&self, kind: EntityKind) -> StoreFuture<'_, Vec<Entity>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().list(kind)) })
	}
}

/// Keyed rows plus the id sequence; shared by the memory and file stores.
#[derive(Debug)]
pub(crate) struct Tables {
	next_id: u64,
	mutations: u64,
	rows: HashMap<EntityKey, Entity>,
}
impl Default for Tables {
	fn default() -> Self {
		Self { next_id: 1, mutations: 0, rows: HashMap::new() }
	}
}
impl Tables {
	pub(crate) fn from_rows(rows: impl IntoIterator<Item = (EntityKey, Entity)>) -> Self {
		let rows = rows.into_iter().collect::<HashMap<_, _>>();
		let next_id =
			rows.values().filter_map(Entity::id).map(|id| id.0).max().map_or(1, |max| max + 1);

		Self { next_id, mutations: 0, rows }
	}

	pub(crate) fn rows(&self) -> impl Iterator<Item = (&EntityKey, &Entity)> {
		self.rows.iter()
	}

	pub(crate) fn find(&self, key: &EntityKey) -> Option<Entity> {
		self.rows.get(key).cloned()
	}

	pub(crate) fn list(&self, kind: EntityKind) -> Vec<Entity> {
		let mut entities = self
			.rows
			.values()
			.filter(|entity| entity.kind() == kind)
			.cloned()
			.collect::<Vec<_>>();

		entities.sort_by_key(Entity::id);

		entities
	}

	pub(crate) fn delete(&mut self, key: &EntityKey) -> Option<Entity> {
		let removed = self.rows.remove(key);

		if removed.is_some() {
			self.mutations += 1;
		}

		removed
	}

	/// Applies create-or-get for unsaved entities and replace-by-id for saved ones.
	pub(crate) fn upsert(&mut self, mut entity: Entity) -> Result<Entity, StoreError> {
		match entity.id() {
			None => {
				if let Some(existing) = entity.unique_key().and_then(|key| self.rows.get(&key)) {
					return Ok(existing.clone());
				}

				let id = self.allocate();

				entity.set_id(id);

				let key = entity.unique_key().unwrap_or(EntityKey::AttributeFilter(id));

				self.rows.insert(key, entity.clone());
			},
			Some(id) => {
				let key = entity.unique_key().unwrap_or(EntityKey::AttributeFilter(id));

				if let Some(holder) = self.rows.get(&key).filter(|holder| holder.id() != Some(id)) {
					return Err(StoreError::UniqueViolation {
						kind: holder.kind().as_str(),
						key: format!("{key:?}"),
					});
				}

				let kind = entity.kind();

				self.rows.retain(|k, e| *k == key || e.kind() != kind || e.id() != Some(id));
				self.rows.insert(key, entity.clone());
				self.next_id = self.next_id.max(id.0 + 1);
			},
		}

		self.mutations += 1;

		Ok(entity)
	}

	fn allocate(&mut self) -> RecordId {
		let id = RecordId(self.next_id);

		self.next_id += 1;

		id
	}
}
