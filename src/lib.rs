//! Authenticated storefront API client: bearer credentials on every request, one shared
//! refresh for every caller that hits an expired credential, and a retry-once guarantee.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod resources;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::GatewayConfig,
		gateway::{Gateway, ReqwestGateway},
		session::{ReqwestSession, Session},
	};

	/// Builds a cookie-aware reqwest gateway pointed at `base_url` (typically an `httpmock`
	/// server URL such as `server.url("/api/v1")`).
	pub fn build_reqwest_test_gateway(base_url: &str) -> ReqwestGateway {
		let config =
			GatewayConfig::new(base_url).expect("Failed to build gateway config for tests.");

		Gateway::new(config).expect("Failed to build reqwest gateway for tests.")
	}

	/// Constructs a [`Session`] over [`build_reqwest_test_gateway`].
	pub fn build_reqwest_test_session(base_url: &str) -> ReqwestSession {
		Session::new(build_reqwest_test_gateway(base_url))
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
