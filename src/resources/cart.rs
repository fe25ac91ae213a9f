//! Shopping cart.

// self
use crate::{
	_prelude::*,
	gateway::Gateway,
	http::GatewayHttpClient,
	obs::{self, OpKind},
};

/// One line of the cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
	/// Cart line id, used to update or remove the line.
	pub id: u64,
	/// Product in the line.
	pub product_id: u64,
	/// Quantity.
	pub qty: u32,
	/// Product title at the time it was added.
	pub title: String,
	/// Unit price as a decimal string.
	pub price: String,
	/// Seller that will receive the order for this line.
	pub seller_id: u64,
}

/// The current user's cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
	/// Cart id.
	pub id: u64,
	/// Owner.
	pub user_id: u64,
	/// Lines in insertion order.
	pub items: Vec<CartItem>,
	/// Sum of all lines as a decimal string.
	pub total_amount: String,
}
impl Cart {
	/// Total number of units across all lines.
	pub fn units(&self) -> u32 {
		self.items.iter().map(|item| item.qty).sum()
	}
}

#[derive(Serialize)]
struct AddCartItem {
	product_id: u64,
	qty: u32,
}

#[derive(Serialize)]
struct UpdateCartItem {
	qty: u32,
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Loads the current cart.
	pub async fn cart(&self) -> Result<Cart> {
		obs::observe(OpKind::Cart, "cart", self.get_json(&self.config().endpoints.cart)).await
	}

	/// Adds `qty` units of a product and returns the updated cart.
	pub async fn add_cart_item(&self, product_id: u64, qty: u32) -> Result<Cart> {
		let path = format!("{}/items", self.config().endpoints.cart);

		obs::observe(
			OpKind::Cart,
			"add_cart_item",
			self.post_json(&path, &AddCartItem { product_id, qty }),
		)
		.await
	}

	/// Sets the quantity of an existing cart line and returns the updated cart.
	pub async fn update_cart_item(&self, item_id: u64, qty: u32) -> Result<Cart> {
		let path = format!("{}/items/{item_id}", self.config().endpoints.cart);

		obs::observe(
			OpKind::Cart,
			"update_cart_item",
			self.put_json(&path, &UpdateCartItem { qty }),
		)
		.await
	}

	/// Removes a cart line and returns the updated cart.
	pub async fn remove_cart_item(&self, item_id: u64) -> Result<Cart> {
		let path = format!("{}/items/{item_id}", self.config().endpoints.cart);

		obs::observe(OpKind::Cart, "remove_cart_item", self.delete_json(&path)).await
	}
}
