//! Optional observability helpers for gateway operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `storefront_gateway.op` with the `op`
//!   and `stage` (call site) fields, plus refresh lifecycle events.
//! - Enable `metrics` to increment the `storefront_gateway_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Authenticated API call through [`crate::gateway::Gateway::send`].
	Send,
	/// Credential refresh protocol.
	Refresh,
	/// Account registration.
	Register,
	/// Email/password login.
	Login,
	/// Session logout.
	Logout,
	/// Current user lookup.
	FetchMe,
	/// Seller role toggle.
	ToggleSeller,
	/// Cart reads and edits.
	Cart,
	/// Favorite product edits.
	Favorites,
	/// Notification feed.
	Notifications,
	/// Buyer/seller messaging.
	Messages,
	/// Order listings.
	Orders,
	/// Cart checkout.
	Checkout,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Send => "send",
			OpKind::Refresh => "refresh",
			OpKind::Register => "register",
			OpKind::Login => "login",
			OpKind::Logout => "logout",
			OpKind::FetchMe => "fetch_me",
			OpKind::ToggleSeller => "toggle_seller",
			OpKind::Cart => "cart",
			OpKind::Favorites => "favorites",
			OpKind::Notifications => "notifications",
			OpKind::Messages => "messages",
			OpKind::Orders => "orders",
			OpKind::Checkout => "checkout",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a gateway helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Wraps `fut` in an operation span and records attempt + terminal outcome.
pub(crate) async fn observe<T, Fut>(kind: OpKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OpSpan::new(kind, stage);

	record_op_outcome(kind, OpOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_op_outcome(kind, OpOutcome::Success),
		Err(_) => record_op_outcome(kind, OpOutcome::Failure),
	}

	result
}
