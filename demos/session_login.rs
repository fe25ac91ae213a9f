//! Demonstrates signing in through [`Session`], then recovering from an expired credential:
//! the cart call is rejected once, the gateway refreshes the bearer token, and the retried
//! call succeeds.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use storefront_gateway::{
	config::GatewayConfig,
	gateway::Gateway,
	session::{ReqwestSession, Session},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let user = json!({
		"id": 7,
		"email": "demo@example.com",
		"roles": ["BUYER"],
		"is_banned": false,
		"is_active": true,
	});

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/login");
			then.status(200).json_body(json!({"access_token": "demo-1", "token_type": "bearer"}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/auth/me");
			then.status(200).json_body(user.clone());
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/cart").header("authorization", "Bearer demo-1");
			then.status(401).json_body(json!({
				"code": "http_error",
				"message": "Token expired",
				"details": {"error": "Token expired"},
			}));
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200).json_body(json!({"access_token": "demo-2", "token_type": "bearer"}));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/cart").header("authorization", "Bearer demo-2");
			then.status(200).json_body(json!({"items": [], "total": "0.00"}));
		})
		.await;

	let config = GatewayConfig::new(server.url("/api/v1"))?
		.with_user_agent("storefront-gateway-demo");
	let session: ReqwestSession = Session::new(Gateway::new(config)?);
	let me = session.login("demo@example.com", "StrongPass123").await?;

	println!("Signed in as {} with roles {:?}.", me.email, session.roles());

	let cart: Value = session.gateway().get_json("/cart").await?;

	refresh.assert_async().await;

	println!(
		"Cart total {} after {} refresh(es).",
		cart["total"],
		session.gateway().refresh_metrics.successes()
	);

	session.logout().await;

	println!("Signed out; authenticated = {}.", session.is_authenticated());

	Ok(())
}
