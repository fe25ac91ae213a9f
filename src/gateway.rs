//! Authenticated request gateway with single-flight credential refresh.
//!
//! [`Gateway::send`] attaches the current bearer credential to every request. When the API
//! answers 401 for a request that is neither the refresh endpoint nor already retried, the
//! gateway runs the refresh protocol and re-issues the request exactly once. Only one refresh
//! runs at a time: the first caller to observe a 401 claims the refresh flag, later callers
//! queue behind it and are resumed in enqueue order once it settles, whether it succeeded or
//! not. A failed refresh clears the credential and surfaces [`Error::RefreshFailed`] to the
//! caller that issued it; queued callers retry with whatever credential is current.

mod metrics;
mod queue;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{BearerCredential, TokenResponse},
	config::GatewayConfig,
	error::{ApiErrorBody, TransportError},
	gateway::queue::{Admission, RefreshLease, SharedRefreshQueue},
	http::{ApiRequest, ApiResponse, GatewayHttpClient},
	obs::{self, OpKind, RefreshStage},
	store::{CredentialStore, MemoryCredentialStore},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestHttpClient>;

/// Issues storefront API calls with an attached credential and recovers from expiry once.
///
/// The gateway owns the credential store, the refresh-in-progress flag, and the queue of
/// callers waiting on a refresh. Clones share all three, so construct one gateway per
/// process or user session and hand clones to every call site.
pub struct Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// HTTP transport used for every outbound request, including refreshes.
	pub http_client: Arc<C>,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	config: Arc<GatewayConfig>,
	store: Arc<dyn CredentialStore>,
	refresh: SharedRefreshQueue,
}
impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Creates a gateway over the caller-provided transport with an in-memory credential store.
	pub fn with_http_client(config: GatewayConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			refresh_metrics: Default::default(),
			config: Arc::new(config),
			store: Arc::new(MemoryCredentialStore::default()),
			refresh: Default::default(),
		}
	}

	/// Replaces the credential store.
	///
	/// The gateway becomes the store's only writer: callers must not keep a handle (for
	/// example a [`MemoryCredentialStore`] clone) and replace the credential behind its back,
	/// or a refresh in flight may overwrite or be overwritten by that write. Use
	/// [`Gateway::set_credential`] and [`Gateway::clear_credential`] instead.
	pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = store;

		self
	}

	/// Returns the configuration this gateway resolves requests against.
	pub fn config(&self) -> &GatewayConfig {
		&self.config
	}

	/// Returns the current credential, if any.
	pub fn credential(&self) -> Option<BearerCredential> {
		self.store.current()
	}

	/// Stores a credential obtained outside the refresh protocol (login, registration).
	pub fn set_credential(&self, credential: BearerCredential) {
		self.store.replace(Some(credential));
	}

	/// Drops the current credential (logout).
	pub fn clear_credential(&self) {
		self.store.replace(None);
	}

	/// Returns `true` while a refresh call is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.refresh.lock().is_refreshing()
	}

	/// Returns the number of callers waiting on the in-flight refresh.
	pub fn pending_refresh_waiters(&self) -> usize {
		self.refresh.lock().waiting()
	}

	/// Sends `request`, refreshing the credential and retrying once on authorization failure.
	///
	/// Returns the response for 2xx statuses. A 401 on a request that is not the refresh
	/// endpoint and has not been retried triggers the refresh protocol followed by exactly
	/// one re-issue; any other failure (including a second 401) is returned unchanged.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		obs::observe(OpKind::Send, "send", self.send_with_recovery(request)).await
	}

	/// Sends `request` and decodes a 2xx JSON body.
	pub async fn send_json<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let path = request.path.clone();
		let response = self.send(request).await?;

		Ok(response.json(&path)?)
	}

	/// `GET path` and decode the JSON body.
	pub async fn get_json<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send_json(ApiRequest::get(path)).await
	}

	/// `POST path` with a JSON body and decode the JSON response.
	pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.send_json(ApiRequest::post(path).with_json(body)?).await
	}

	/// `POST path` without a body, discarding the response payload.
	pub async fn post_empty(&self, path: &str) -> Result<()> {
		self.send(ApiRequest::post(path)).await.map(|_| ())
	}

	/// `PUT path` with a JSON body and decode the JSON response.
	pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.send_json(ApiRequest::put(path).with_json(body)?).await
	}

	/// `DELETE path` and decode the JSON response.
	pub async fn delete_json<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send_json(ApiRequest::delete(path)).await
	}

	/// Runs the refresh protocol outside of a failed request.
	///
	/// When a refresh is already in flight this joins it instead of issuing another call and
	/// reports the credential it left behind.
	pub async fn refresh(&self) -> Result<BearerCredential> {
		let path = self.config.endpoints.refresh.clone();

		obs::observe(OpKind::Refresh, "refresh", async {
			match queue::admit(&self.refresh, &path) {
				Admission::Lead(lease) => self.lead_refresh(lease).await,
				Admission::Wait { ahead, resume } => {
					self.wait_for_refresh(&path, ahead, resume).await;

					self.credential().ok_or_else(|| {
						Error::refresh_failed(Error::Unauthorized { path: path.clone(), body: None })
					})
				},
			}
		})
		.await
	}

	async fn send_with_recovery(&self, mut request: ApiRequest) -> Result<ApiResponse> {
		let response = self.dispatch(&request).await?;

		if response.is_success() {
			return Ok(response);
		}
		if !response.is_unauthorized()
			|| request.retried
			|| self.config.endpoints.is_refresh(&request.path)
		{
			return Err(failure(&request.path, response));
		}

		request.retried = true;

		match queue::admit(&self.refresh, &request.path) {
			Admission::Lead(lease) => {
				obs::observe(OpKind::Refresh, "recover", self.lead_refresh(lease)).await?;
			},
			Admission::Wait { ahead, resume } =>
				self.wait_for_refresh(&request.path, ahead, resume).await,
		}

		self.refresh_metrics.record_retry();

		let retried = self.dispatch(&request).await?;

		if retried.is_success() { Ok(retried) } else { Err(failure(&request.path, retried)) }
	}

	/// Issues the refresh call while holding the lease, stores the outcome, then releases.
	async fn lead_refresh(&self, lease: RefreshLease) -> Result<BearerCredential> {
		let path = lease.path().to_owned();

		self.refresh_metrics.record_attempt();
		obs::record_refresh_stage(RefreshStage::Started, &path, 0);

		let outcome = self.call_refresh_endpoint().await;
		let (result, stage) = match outcome {
			Ok(credential) => {
				self.store.replace(Some(credential.clone()));
				self.refresh_metrics.record_success();

				(Ok(credential), RefreshStage::Succeeded)
			},
			Err(err) => {
				self.store.replace(None);
				self.refresh_metrics.record_failure();

				(Err(Error::refresh_failed(err)), RefreshStage::Failed)
			},
		};
		let resumed = lease.release();

		obs::record_refresh_stage(stage, &path, resumed.len());

		result
	}

	async fn wait_for_refresh(
		&self,
		path: &str,
		ahead: usize,
		resume: futures::channel::oneshot::Receiver<()>,
	) {
		self.refresh_metrics.record_queued();
		obs::record_refresh_stage(RefreshStage::Queued, path, ahead + 1);

		// Cancellation means the lease was dropped mid-settle; either way the refresh is over.
		let _ = resume.await;
	}

	async fn call_refresh_endpoint(&self) -> Result<BearerCredential> {
		let request = ApiRequest::post(self.config.endpoints.refresh.as_str());
		let response = self.dispatch(&request).await?;

		if !response.is_success() {
			return Err(failure(&request.path, response));
		}

		let token: TokenResponse = response.json(&request.path)?;

		Ok(token.access_token)
	}

	/// Attaches the current credential and hands the request to the transport.
	async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let url = request.url(&self.config)?;
		let mut outbound = request.clone();

		if let Some(credential) = self.store.current() {
			outbound.headers.insert("authorization".into(), credential.authorization_value());
		}

		self.http_client.execute(url, outbound).await.map_err(|e| TransportError::network(e).into())
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient> {
	/// Creates a gateway backed by a cookie-aware reqwest client built from `config`.
	pub fn new(config: GatewayConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(&config)?;

		Ok(Self::with_http_client(config, http_client))
	}
}
impl<C> Clone for Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			config: self.config.clone(),
			store: self.store.clone(),
			refresh: self.refresh.clone(),
		}
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("base_url", &self.config.base_url.as_str())
			.field("credential_set", &self.store.current().is_some())
			.field("refreshing", &self.is_refreshing())
			.finish()
	}
}

/// Converts a non-2xx response into the matching [`Error`] variant.
fn failure(path: &str, response: ApiResponse) -> Error {
	let body = ApiErrorBody::from_slice(&response.body);

	if response.is_unauthorized() {
		Error::Unauthorized { path: path.to_owned(), body }
	} else {
		Error::Status {
			status: response.status,
			path: path.to_owned(),
			retry_after: response.retry_after,
			body,
		}
	}
}
