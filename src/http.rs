//! Transport primitives for storefront API calls.
//!
//! The module exposes [`GatewayHttpClient`] alongside the transport-agnostic
//! [`ApiRequest`] and [`ApiResponse`] models so downstream crates can plug in custom HTTP
//! stacks (or scripted fakes) without touching the refresh protocol. Implementations must
//! return [`ApiResponse`] for every HTTP status and reserve their error type for failures
//! that never produced a status line (DNS, TCP, TLS, body reads).

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, config::GatewayConfig, error::DecodeError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`GatewayHttpClient::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing storefront API calls.
///
/// The trait is the gateway's only dependency on an HTTP stack. The gateway has already
/// attached the `Authorization` header (when a credential is present) to the request it
/// hands over, so implementations forward headers verbatim. Implementations must be
/// `Send + Sync + 'static` so one transport can back every clone of a gateway.
pub trait GatewayHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Issues `request` against the fully resolved `url`.
	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// HTTP methods used by the storefront API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound API call relative to the configured base URL.
///
/// Header names are stored lowercase. `retried` marks a request the gateway has already
/// re-issued after a refresh; a second authorization failure on such a request is final.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path appended to the base URL (for example `/cart`).
	pub path: String,
	/// Query pairs appended to the resolved URL.
	pub query: Vec<(String, String)>,
	/// Extra request headers.
	pub headers: BTreeMap<String, String>,
	/// Pre-encoded JSON body.
	pub body: Option<Vec<u8>>,
	/// Set once the gateway re-issues the request after a refresh.
	pub retried: bool,
}
impl ApiRequest {
	/// Creates a request with no query, headers, or body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: BTreeMap::new(),
			body: None,
			retried: false,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Appends a query pair.
	pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Sets a header, replacing any previous value.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Serializes `body` as the JSON payload.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self, DecodeError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body).map_err(DecodeError::Request)?);

		Ok(self.with_header("content-type", "application/json"))
	}

	/// Returns a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Resolves the absolute URL for this request.
	pub fn url(&self, config: &GatewayConfig) -> Result<Url> {
		Ok(config.resolve(&self.path, &self.query)?)
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let headers = self
			.headers
			.iter()
			.map(|(name, value)| {
				let value = if name == "authorization" { "<redacted>" } else { value.as_str() };

				(name.as_str(), value)
			})
			.collect::<Vec<_>>();

		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("path", &self.path)
			.field("query", &self.query)
			.field("headers", &headers)
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.field("retried", &self.retried)
			.finish()
	}
}

/// Response captured from the storefront API for any HTTP status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers with lowercase names.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl ApiResponse {
	/// Creates a response with the given status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into(), ..Default::default() }
	}

	/// Sets a header, replacing any previous value.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` when the API denied authorization.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Decodes the body as JSON, reporting the failing JSON path on mismatch.
	pub fn json<T>(&self, path: &str) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError::Response { path: path.to_owned(), source })
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The refresh endpoint authenticates through an HTTP-only cookie issued at login, so the
/// wrapped client must keep a cookie store; [`ReqwestHttpClient::from_config`] enables it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a cookie-aware client honoring the configured timeout and user agent.
	pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().cookie_store(true);

		if let Some(timeout) = config.timeout {
			builder = builder.timeout(timeout);
		}
		if let Some(user_agent) = &config.user_agent {
			builder = builder.user_agent(user_agent.as_str());
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl GatewayHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let ApiRequest { method, headers, body, .. } = request;
			let mut builder = client.request(reqwest_method(method), url);

			for (name, value) in &headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let raw_headers = response.headers().to_owned();
			let retry_after = parse_retry_after(&raw_headers);
			let headers = raw_headers
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body, retry_after })
		})
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Delete => reqwest::Method::DELETE,
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;

	parse_retry_after_value(value.to_str().ok()?, OffsetDateTime::now_utc())
}

/// Parses a `Retry-After` value given as delta seconds or an RFC 2822 date.
#[cfg(feature = "reqwest")]
fn parse_retry_after_value(raw: &str, now: OffsetDateTime) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - now;

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
