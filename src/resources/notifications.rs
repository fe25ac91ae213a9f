//! In-app notification feed.

// self
use crate::{
	_prelude::*,
	gateway::Gateway,
	http::{ApiRequest, GatewayHttpClient},
	obs::{self, OpKind},
};

/// Event that produced a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
	/// A buyer placed an order with the seller.
	NewOrder,
	/// A conversation received a message.
	NewMessage,
	/// Moderation approved a product.
	ProductApproved,
	/// Moderation rejected a product.
	ProductRejected,
	/// A product received a review.
	NewReview,
	/// Any kind this client does not know yet.
	#[serde(other)]
	Other,
}

/// One notification addressed to the current user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
	/// Notification id.
	pub id: u64,
	/// Recipient.
	pub user_id: u64,
	/// Producing event.
	#[serde(rename = "type")]
	pub kind: NotificationKind,
	/// Event-specific details.
	#[serde(default)]
	pub payload_json: serde_json::Map<String, serde_json::Value>,
	/// Whether the recipient has opened it.
	pub is_read: bool,
	/// Creation time.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Lists the current user's notifications.
	pub async fn notifications(&self) -> Result<Vec<Notification>> {
		let path = &self.config().endpoints.notifications;

		obs::observe(OpKind::Notifications, "notifications", self.get_json(path)).await
	}

	/// Marks a notification as read and returns its updated state.
	pub async fn mark_notification_read(&self, id: u64) -> Result<Notification> {
		let path = format!("{}/{id}/read", self.config().endpoints.notifications);

		obs::observe(
			OpKind::Notifications,
			"mark_notification_read",
			self.send_json(ApiRequest::post(path)),
		)
		.await
	}
}
