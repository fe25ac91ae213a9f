//! Buyer/seller conversations.

// self
use crate::{
	_prelude::*,
	gateway::Gateway,
	http::GatewayHttpClient,
	obs::{self, OpKind},
};

/// Conversation between a buyer and a seller, optionally about one product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
	/// Conversation id.
	pub id: u64,
	/// Buyer side.
	pub buyer_id: u64,
	/// Seller side.
	pub seller_id: u64,
	/// Product the conversation started from.
	pub product_id: Option<u64>,
	/// Creation time.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Time of the latest message.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

/// One message in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	/// Message id.
	pub id: u64,
	/// Owning conversation.
	pub conversation_id: u64,
	/// Author.
	pub sender_id: u64,
	/// Text body.
	pub body: String,
	/// Whether the other side has read it.
	pub is_read: bool,
	/// Send time.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

#[derive(Serialize)]
struct NewMessage<'a> {
	body: &'a str,
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Lists the current user's conversations.
	pub async fn conversations(&self) -> Result<Vec<Conversation>> {
		let path = &self.config().endpoints.conversations;

		obs::observe(OpKind::Messages, "conversations", self.get_json(path)).await
	}

	/// Loads the messages of one conversation, oldest first.
	pub async fn conversation_messages(&self, conversation_id: u64) -> Result<Vec<Message>> {
		let path = format!("{}/{conversation_id}", self.config().endpoints.conversations);

		obs::observe(OpKind::Messages, "conversation_messages", self.get_json(&path)).await
	}

	/// Posts a message to a conversation.
	pub async fn send_message(&self, conversation_id: u64, body: &str) -> Result<Message> {
		let path = format!("{}/{conversation_id}", self.config().endpoints.conversations);

		obs::observe(OpKind::Messages, "send_message", self.post_json(&path, &NewMessage { body }))
			.await
	}
}
