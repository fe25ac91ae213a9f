//! Credential storage contract and the built-in process-local store.

pub mod memory;

pub use memory::MemoryCredentialStore;

// self
use crate::{_prelude::*, auth::BearerCredential};

/// Storage backend holding the gateway's current bearer credential.
///
/// Only the gateway writes through this trait; every other component reads the credential
/// from the gateway. Implementations must be cheap and non-blocking because the gateway
/// reads the credential on every outbound request.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the current credential, if any.
	fn current(&self) -> Option<BearerCredential>;

	/// Replaces the current credential, returning the previous value.
	fn replace(&self, credential: Option<BearerCredential>) -> Option<BearerCredential>;
}
impl<T> CredentialStore for Arc<T>
where
	T: ?Sized + CredentialStore,
{
	fn current(&self) -> Option<BearerCredential> {
		(**self).current()
	}

	fn replace(&self, credential: Option<BearerCredential>) -> Option<BearerCredential> {
		(**self).replace(credential)
	}
}
