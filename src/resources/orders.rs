//! Order listings and checkout.

// self
use crate::{
	_prelude::*,
	gateway::Gateway,
	http::GatewayHttpClient,
	obs::{self, OpKind},
};

/// Order lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
	/// Placed by the buyer, awaiting the seller.
	Requested,
	/// Accepted by the seller.
	Accepted,
	/// Declined by the seller.
	Rejected,
	/// Fulfilled.
	Completed,
	/// Withdrawn.
	Canceled,
}

/// Snapshot of one purchased product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
	/// Line id.
	pub id: u64,
	/// Source product; absent once the product is deleted.
	pub product_id: Option<u64>,
	/// Title at checkout time.
	pub product_title_snapshot: String,
	/// Unit price at checkout time.
	pub product_price_snapshot: String,
	/// Quantity.
	pub qty: u32,
	/// Line total.
	pub subtotal: String,
}

/// Order between one buyer and one seller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Order id.
	pub id: u64,
	/// Buyer.
	pub buyer_id: u64,
	/// Seller.
	pub seller_id: u64,
	/// Current state.
	pub status: OrderStatus,
	/// Recipient name.
	pub full_name: String,
	/// Recipient phone.
	pub phone: String,
	/// Delivery address.
	pub address: String,
	/// Buyer note.
	pub comment: Option<String>,
	/// Order total.
	pub total_amount: String,
	/// Placement time.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Purchased lines.
	pub items: Vec<OrderItem>,
}

/// Delivery details submitted at checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
	/// Recipient name.
	pub full_name: String,
	/// Recipient phone.
	pub phone: String,
	/// Delivery address.
	pub address: String,
	/// Optional buyer note.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
}
impl CheckoutRequest {
	/// Creates a request without a comment.
	pub fn new(
		full_name: impl Into<String>,
		phone: impl Into<String>,
		address: impl Into<String>,
	) -> Self {
		Self {
			full_name: full_name.into(),
			phone: phone.into(),
			address: address.into(),
			comment: None,
		}
	}

	/// Attaches a buyer note.
	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());

		self
	}
}

/// Checkout result: the cart is split into one order per seller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
	/// Created orders.
	pub orders: Vec<Order>,
	/// Number of created orders.
	pub total_orders: u32,
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Lists orders placed by the current buyer.
	pub async fn buyer_orders(&self) -> Result<Vec<Order>> {
		let path = &self.config().endpoints.buyer_orders;

		obs::observe(OpKind::Orders, "buyer_orders", self.get_json(path)).await
	}

	/// Lists orders addressed to the current seller.
	pub async fn seller_orders(&self) -> Result<Vec<Order>> {
		let path = &self.config().endpoints.seller_orders;

		obs::observe(OpKind::Orders, "seller_orders", self.get_json(path)).await
	}

	/// Turns the cart into orders.
	pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse> {
		let path = &self.config().endpoints.checkout;

		obs::observe(OpKind::Checkout, "checkout", self.post_json(path, request)).await
	}
}
