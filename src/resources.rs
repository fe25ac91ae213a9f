//! Storefront resource calls issued through the [`Gateway`](crate::gateway::Gateway).
//!
//! Each submodule adds typed methods to the gateway for one API area, so every resource call
//! inherits credential attachment and the refresh-and-retry-once recovery. Monetary amounts
//! are kept as the decimal strings the API emits.

pub mod cart;
pub mod favorites;
pub mod messages;
pub mod notifications;
pub mod orders;

pub use cart::*;
pub use favorites::*;
pub use messages::*;
pub use notifications::*;
pub use orders::*;

// self
use crate::_prelude::*;

/// Plain acknowledgement body (`{"message": "..."}`) returned by mutation endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
	/// Human-readable confirmation.
	pub message: String,
}
