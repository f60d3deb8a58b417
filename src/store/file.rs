//! Simple file-backed [`CredentialStore`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{CredentialStore, Entity, EntityKey, EntityKind, StoreError, StoreFuture, memory::Tables},
};

/// Persists credential records to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Tables>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let tables = Tables::from_rows(Self::load_snapshot(&path)?);

		Ok(Self { path, inner: Arc::new(RwLock::new(tables)) })
	}

	fn load_snapshot(path: &Path) -> Result<Vec<(EntityKey, Entity)>, StoreError> {
		if !path.exists() {
			return Ok(Vec::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Vec::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, tables: &Tables) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let mut snapshot = tables.rows().collect::<Vec<_>>();

		snapshot.sort_by_key(|(_, entity)| (entity.kind().as_str(), entity.id()));

		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn find<'a>(&'a self, key: &'a EntityKey) -> StoreFuture<'a, Option<Entity>> {
		Box::pin(async move { Ok(self.inner.read().find(key)) })
	}

	fn upsert(&self, entity: Entity) -> StoreFuture<'_, Entity> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let before = guard.rows().count();
			let id_known = entity.id().is_some();
			let stored = guard.upsert(entity)?;

			if id_known || guard.rows().count() != before {
				self.persist_locked(&guard)?;
			}

			Ok(stored)
		})
	}

	fn delete<'a>(&'a self, key: &'a EntityKey) -> StoreFuture<'a, Option<Entity>> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let removed = guard.delete(key);

			if removed.is_some() {
				self.persist_locked(&guard)?;
			}

			Ok(removed)
		})
	}

	fn list(&self, kind: EntityKind) -> StoreFuture<'_, Vec<Entity>> {
		Box::pin(async move { Ok(self.inner.read().list(kind)) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::{Consumer, ConsumerName};

	fn temp_path() -> PathBuf {
		let unique = format!(
			"styla_connect_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let name = ConsumerName::new("Styla Api Connector").expect("Failed to build consumer name.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let stored = rt
			.block_on(store.upsert(Entity::Consumer(Consumer::generate(name.clone()))))
			.expect("Failed to save consumer into file store.");

		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.find(&EntityKey::Consumer(name)))
			.expect("Failed to fetch consumer from file store.")
			.expect("File store lost record after reopen.");

		assert_eq!(fetched, stored);

		let removed = rt
			.block_on(reopened.delete(&EntityKey::Consumer(
				ConsumerName::new("Styla Api Connector").expect("Failed to build consumer name."),
			)))
			.expect("Failed to delete consumer from file store.");

		assert!(removed.is_some());
		assert!(
			FileStore::open(&path)
				.map(|store| store.inner.read().rows().count() == 0)
				.expect("Failed to reopen file store after delete.")
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
