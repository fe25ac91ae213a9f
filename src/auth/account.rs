//! Account payloads exchanged with the storefront auth endpoints.

// self
use crate::{_prelude::*, auth::BearerCredential};

/// Storefront role names as serialized by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleName {
	/// Regular customer.
	Buyer,
	/// Merchant with a seller dashboard.
	Seller,
	/// Platform administrator.
	Admin,
}
impl RoleName {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			RoleName::Buyer => "BUYER",
			RoleName::Seller => "SELLER",
			RoleName::Admin => "ADMIN",
		}
	}
}
impl Display for RoleName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Profile of the authenticated user returned by `/auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMe {
	/// Numeric user identifier.
	pub id: u64,
	/// Login email.
	pub email: String,
	/// Roles granted to the user.
	pub roles: Vec<RoleName>,
	/// Whether an administrator banned the account.
	pub is_banned: bool,
	/// Whether the account is active.
	pub is_active: bool,
}
impl UserMe {
	/// Returns `true` when the user holds `role`.
	pub fn has_role(&self, role: RoleName) -> bool {
		self.roles.contains(&role)
	}
}

/// Email/password pair posted to the register and login endpoints.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
	/// Login email.
	pub email: String,
	/// Plain-text password; only ever serialized into the request body.
	pub password: String,
}
impl LoginRequest {
	/// Builds a new request payload.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Access token payload returned by register, login, and refresh.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
	/// Newly issued bearer credential.
	pub access_token: BearerCredential,
	/// Token type; the API always answers `bearer`.
	#[serde(default = "TokenResponse::default_token_type")]
	pub token_type: String,
}
impl TokenResponse {
	fn default_token_type() -> String {
		"bearer".into()
	}
}
