//! Favorite products.

// self
use crate::{
	_prelude::*,
	gateway::Gateway,
	http::{ApiRequest, GatewayHttpClient},
	obs::{self, OpKind},
	resources::Acknowledgement,
};

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Lists the ids of the current user's favorite products.
	pub async fn favorites(&self) -> Result<Vec<u64>> {
		let path = &self.config().endpoints.favorites;

		obs::observe(OpKind::Favorites, "favorites", self.get_json(path)).await
	}

	/// Marks a product as favorite.
	pub async fn add_favorite(&self, product_id: u64) -> Result<Acknowledgement> {
		let path = format!("{}/{product_id}", self.config().endpoints.favorites);

		obs::observe(OpKind::Favorites, "add_favorite", self.send_json(ApiRequest::post(path)))
			.await
	}

	/// Removes a product from the favorites.
	pub async fn remove_favorite(&self, product_id: u64) -> Result<Acknowledgement> {
		let path = format!("{}/{product_id}", self.config().endpoints.favorites);

		obs::observe(OpKind::Favorites, "remove_favorite", self.delete_json(&path)).await
	}

	/// Adds or removes a favorite so that its state becomes `favorite`.
	pub async fn set_favorite(&self, product_id: u64, favorite: bool) -> Result<Acknowledgement> {
		if favorite {
			self.add_favorite(product_id).await
		} else {
			self.remove_favorite(product_id).await
		}
	}
}
