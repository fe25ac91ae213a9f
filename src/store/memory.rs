//! Thread-safe in-memory [`CredentialStore`] implementation.

// self
use crate::{_prelude::*, auth::BearerCredential, store::CredentialStore};

/// Process-local credential slot; nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore(Arc<RwLock<Option<BearerCredential>>>);
impl MemoryCredentialStore {
	/// Creates a store seeded with `credential`.
	pub fn with_credential(credential: BearerCredential) -> Self {
		Self(Arc::new(RwLock::new(Some(credential))))
	}
}
impl CredentialStore for MemoryCredentialStore {
	fn current(&self) -> Option<BearerCredential> {
		self.0.read().clone()
	}

	fn replace(&self, credential: Option<BearerCredential>) -> Option<BearerCredential> {
		std::mem::replace(&mut *self.0.write(), credential)
	}
}
