//! Account session operations layered on the gateway.
//!
//! [`Session`] is the only component besides the refresh protocol that writes the gateway's
//! credential: register and login store the issued access token, logout clears it. The
//! session also caches the current [`UserMe`] so callers can answer role questions without
//! another round trip.

// self
use crate::{
	_prelude::*,
	auth::{LoginRequest, RoleName, TokenResponse, UserMe},
	gateway::Gateway,
	http::{ApiRequest, GatewayHttpClient},
	obs::{self, OpKind},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Session specialized for the crate's default reqwest transport.
pub type ReqwestSession = Session<ReqwestHttpClient>;

/// Authenticated storefront session: a gateway plus the cached current user.
pub struct Session<C>
where
	C: ?Sized + GatewayHttpClient,
{
	gateway: Gateway<C>,
	me: Arc<RwLock<Option<UserMe>>>,
}
impl<C> Session<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Wraps `gateway`; the session starts signed out unless the gateway holds a credential.
	pub fn new(gateway: Gateway<C>) -> Self {
		Self { gateway, me: Default::default() }
	}

	/// Returns the underlying gateway for arbitrary API calls.
	pub fn gateway(&self) -> &Gateway<C> {
		&self.gateway
	}

	/// Returns the cached current user.
	pub fn me(&self) -> Option<UserMe> {
		self.me.read().clone()
	}

	/// Returns the cached user's roles, empty when signed out.
	pub fn roles(&self) -> Vec<RoleName> {
		self.me.read().as_ref().map(|me| me.roles.clone()).unwrap_or_default()
	}

	/// Returns `true` when the cached user holds `role`.
	pub fn has_role(&self, role: RoleName) -> bool {
		self.me.read().as_ref().is_some_and(|me| me.has_role(role))
	}

	/// Returns `true` when both a credential and a cached user are present.
	pub fn is_authenticated(&self) -> bool {
		self.gateway.credential().is_some() && self.me.read().is_some()
	}

	/// Creates an account, stores the issued credential, and loads the user.
	pub async fn register(
		&self,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Result<UserMe> {
		let payload = LoginRequest::new(email, password);
		let path = self.gateway.config().endpoints.register.clone();

		obs::observe(OpKind::Register, "register", self.authenticate(&path, &payload)).await
	}

	/// Signs in, stores the issued credential, and loads the user.
	pub async fn login(
		&self,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Result<UserMe> {
		let payload = LoginRequest::new(email, password);
		let path = self.gateway.config().endpoints.login.clone();

		obs::observe(OpKind::Login, "login", self.authenticate(&path, &payload)).await
	}

	/// Loads `/auth/me` into the cache.
	pub async fn fetch_me(&self) -> Result<UserMe> {
		obs::observe(OpKind::FetchMe, "fetch_me", self.load_me()).await
	}

	/// Refreshes the credential through the gateway, then reloads the user.
	pub async fn refresh(&self) -> Result<UserMe> {
		self.gateway.refresh().await?;

		self.fetch_me().await
	}

	/// Signs out. Local state is cleared even when the API call fails, since an already
	/// expired session must still be able to log out.
	pub async fn logout(&self) {
		let path = self.gateway.config().endpoints.logout.clone();
		// Failure is recorded by the span; the local sign-out below happens regardless.
		let _ = obs::observe(OpKind::Logout, "logout", self.gateway.post_empty(&path)).await;

		self.gateway.clear_credential();
		*self.me.write() = None;
	}

	/// Grants (`true`) or drops (`false`) the seller role and caches the updated user.
	pub async fn toggle_seller(&self, enabled: bool) -> Result<UserMe> {
		let path = self.gateway.config().endpoints.seller_role.clone();
		let request = ApiRequest::post(path).with_query("enabled", enabled);

		obs::observe(OpKind::ToggleSeller, "toggle_seller", async {
			let me: UserMe = self.gateway.send_json(request).await?;

			*self.me.write() = Some(me.clone());

			Ok(me)
		})
		.await
	}

	async fn authenticate(&self, path: &str, payload: &LoginRequest) -> Result<UserMe> {
		let token: TokenResponse = self.gateway.post_json(path, payload).await?;

		self.gateway.set_credential(token.access_token);

		self.load_me().await
	}

	async fn load_me(&self) -> Result<UserMe> {
		let path = self.gateway.config().endpoints.me.clone();
		let me: UserMe = self.gateway.get_json(&path).await?;

		*self.me.write() = Some(me.clone());

		Ok(me)
	}
}
impl<C> Clone for Session<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn clone(&self) -> Self {
		Self { gateway: self.gateway.clone(), me: self.me.clone() }
	}
}
impl<C> Debug for Session<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("gateway", &self.gateway)
			.field("me", &*self.me.read())
			.finish()
	}
}
