//! Gateway configuration: base URL, endpoint routes, and transport knobs.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable consulted by [`GatewayConfig::from_env`].
pub const BASE_URL_ENV: &str = "STOREFRONT_API_BASE_URL";
/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Routes relative to the API base URL.
///
/// Resource routes are collection roots; item routes are derived from them (for example
/// `{cart}/items/{id}` or `{notifications}/{id}/read`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
	/// Account registration.
	pub register: String,
	/// Email/password login.
	pub login: String,
	/// Session logout.
	pub logout: String,
	/// Cookie-backed access token refresh.
	pub refresh: String,
	/// Current user profile.
	pub me: String,
	/// Seller role toggle.
	pub seller_role: String,
	/// Current user's cart.
	pub cart: String,
	/// Favorite product ids.
	pub favorites: String,
	/// In-app notifications.
	pub notifications: String,
	/// Buyer/seller conversations.
	pub conversations: String,
	/// Orders placed by the current buyer.
	pub buyer_orders: String,
	/// Orders addressed to the current seller.
	pub seller_orders: String,
	/// Cart checkout.
	pub checkout: String,
}
impl Endpoints {
	/// Returns `true` when `path` targets the refresh route.
	pub fn is_refresh(&self, path: &str) -> bool {
		path.contains(self.refresh.as_str())
	}
}
impl Default for Endpoints {
	fn default() -> Self {
		Self {
			register: "/auth/register".into(),
			login: "/auth/login".into(),
			logout: "/auth/logout".into(),
			refresh: "/auth/refresh".into(),
			me: "/auth/me".into(),
			seller_role: "/auth/roles/seller".into(),
			cart: "/cart".into(),
			favorites: "/favorites".into(),
			notifications: "/notifications".into(),
			conversations: "/messages/conversations".into(),
			buyer_orders: "/orders/my".into(),
			seller_orders: "/orders/seller".into(),
			checkout: "/orders/checkout".into(),
		}
	}
}

/// Settings shared by the gateway and its default transport.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
	/// API root every request path is appended to.
	pub base_url: Url,
	/// Auth routes.
	pub endpoints: Endpoints,
	/// Per-request timeout applied by the default transport.
	pub timeout: Option<StdDuration>,
	/// Optional `User-Agent` override.
	pub user_agent: Option<String>,
}
impl GatewayConfig {
	/// Creates a configuration for the provided base URL.
	pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
		Ok(Self {
			base_url: parse_base_url(base_url.as_ref())?,
			endpoints: Endpoints::default(),
			timeout: None,
			user_agent: None,
		})
	}

	/// Reads the base URL from [`BASE_URL_ENV`], falling back to [`DEFAULT_BASE_URL`].
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::new(base_url_or_default(std::env::var(BASE_URL_ENV).ok().as_deref()))
	}

	/// Replaces the endpoint table.
	pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Sets the per-request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sets the `User-Agent` header sent by the default transport.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Resolves `path` (plus query pairs) against the base URL.
	///
	/// Paths are appended to the base path rather than replacing it, so `/auth/me` on
	/// `http://host/api/v1` yields `http://host/api/v1/auth/me`.
	pub fn resolve(&self, path: &str, query: &[(String, String)]) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};
		let mut url = Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })?;

		if !query.is_empty() {
			url.query_pairs_mut()
				.extend_pairs(query.iter().map(|(key, value)| (key.as_str(), value.as_str())));
		}

		Ok(url)
	}
}

/// Picks the configured base URL, treating an unset or blank value as [`DEFAULT_BASE_URL`].
fn base_url_or_default(value: Option<&str>) -> &str {
	match value.map(str::trim) {
		Some(value) if !value.is_empty() => value,
		_ => DEFAULT_BASE_URL,
	}
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(value).map_err(|source| ConfigError::InvalidBaseUrl {
		value: value.to_owned(),
		source: Some(source),
	})?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ConfigError::InvalidBaseUrl { value: value.to_owned(), source: None }),
	}
}
