//! Thread-safe in-memory [`KeyValueStore`] for session-scoped values and tests.

// self
use crate::{
	_prelude::*,
	store::{KeyValueStore, StoreError},
};

/// Storage backend that keeps values in-process; nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<HashMap<String, String>>>);
impl MemoryStore {
	/// Returns the number of stored keys.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.0.read().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.0.write().insert(key.to_owned(), value.to_owned());

		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.0.write().remove(key);

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn clones_share_the_same_map() {
		let store = MemoryStore::default();
		let view = store.clone();

		store.set("auth_token", "abc").expect("Memory store writes should not fail.");

		assert_eq!(
			view.get("auth_token").expect("Memory store reads should not fail."),
			Some("abc".into())
		);

		view.remove("auth_token").expect("Memory store removals should not fail.");

		assert!(store.is_empty());
		view.remove("auth_token").expect("Removing a missing key should succeed.");
	}
}
