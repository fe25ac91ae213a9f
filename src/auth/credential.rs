//! Bearer credential wrapper that redacts sensitive material.

// self
use crate::_prelude::*;

/// Opaque bearer token presented on each request; formatting never reveals the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerCredential(String);
impl BearerCredential {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Renders the `Authorization` header value for this credential.
	pub fn authorization_value(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl AsRef<str> for BearerCredential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for BearerCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BearerCredential").field(&"<redacted>").finish()
	}
}
impl Display for BearerCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
