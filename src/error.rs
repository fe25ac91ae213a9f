//! Gateway-level error types shared across the transport, refresh protocol, and session layer.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response or request body could not be (de)serialized.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The API denied authorization (HTTP 401) and no further recovery applies.
	#[error("Authorization denied for `{path}`.")]
	Unauthorized {
		/// Request path that was rejected.
		path: String,
		/// Decoded error envelope, when the API supplied one.
		body: Option<ApiErrorBody>,
	},
	/// The refresh endpoint failed; the credential has been cleared.
	#[error("Credential refresh failed.")]
	RefreshFailed {
		/// Failure reported by the refresh call.
		#[source]
		source: Box<Error>,
	},
	/// The API answered with a non-success status other than 401.
	#[error("API returned status {status} for `{path}`.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Request path that failed.
		path: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Decoded error envelope, when the API supplied one.
		body: Option<ApiErrorBody>,
	},
}
impl Error {
	/// Returns `true` when the error is a final authorization denial.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized { .. })
	}

	/// Returns the HTTP status associated with the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Unauthorized { .. } => Some(401),
			Self::Status { status, .. } => Some(*status),
			Self::RefreshFailed { source } => source.status(),
			_ => None,
		}
	}

	pub(crate) fn refresh_failed(source: Error) -> Self {
		Self::RefreshFailed { source: Box::new(source) }
	}
}

/// Error envelope returned by the storefront API for failed requests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
	/// Machine-readable error code (`http_error`, `internal_error`, ...).
	#[serde(default)]
	pub code: Option<String>,
	/// Human-readable message.
	#[serde(default)]
	pub message: Option<String>,
	/// Free-form details object.
	#[serde(default)]
	pub details: Option<serde_json::Value>,
	/// Server-side request identifier for correlation.
	#[serde(default)]
	pub request_id: Option<String>,
}
impl ApiErrorBody {
	/// Attempts to decode an error envelope from a raw response body.
	pub fn from_slice(body: &[u8]) -> Option<Self> {
		if body.is_empty() {
			return None;
		}

		serde_json::from_slice(body).ok()
	}
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed or uses an unsupported scheme.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Offending value.
		value: String,
		/// Underlying parsing failure, when parsing was the problem.
		#[source]
		source: Option<url::ParseError>,
	},
	/// A request path could not be joined onto the base URL.
	#[error("Request path `{path}` is invalid.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Body encoding and decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body was not the JSON shape the caller expected.
	#[error("Response from `{path}` is malformed.")]
	Response {
		/// Request path whose response failed to decode.
		path: String,
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be encoded.")]
	Request(#[source] serde_json::Error),
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the storefront API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
