// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{Arc, Mutex},
	time::Duration,
};
// crates.io
use tokio::sync::Notify;
// self
use storefront_gateway::{
	auth::BearerCredential,
	config::{Endpoints, GatewayConfig},
	error::Error,
	gateway::Gateway,
	http::{ApiRequest, ApiResponse, GatewayHttpClient, TransportFuture},
	store::{CredentialStore, MemoryCredentialStore},
	url::Url,
};

#[derive(Debug)]
struct ConnectionReset;
impl Display for ConnectionReset {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Connection reset by peer.")
	}
}
impl StdError for ConnectionReset {}

#[derive(Clone, Copy, Debug)]
enum RefreshScript {
	Issue(&'static str),
	Deny,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Seen {
	path: String,
	authorization: Option<String>,
}

#[derive(Debug)]
struct ScriptState {
	accepted: Option<String>,
	refresh: RefreshScript,
	refresh_calls: usize,
	log: Vec<Seen>,
}

/// Scripted storefront API.
///
/// Protected paths answer 200 only for the currently accepted token, `/locked/*` always
/// answers 401, `/missing` answers 404, and `/broken` fails at the transport level. The
/// refresh endpoint optionally blocks on `gate` before answering so tests can pile callers
/// up behind it.
#[derive(Clone)]
struct ScriptedApi {
	state: Arc<Mutex<ScriptState>>,
	gate: Option<Arc<Notify>>,
	refresh_route: &'static str,
}
impl ScriptedApi {
	fn new(accepted: Option<&str>, refresh: RefreshScript) -> Self {
		Self {
			state: Arc::new(Mutex::new(ScriptState {
				accepted: accepted.map(str::to_owned),
				refresh,
				refresh_calls: 0,
				log: Vec::new(),
			})),
			gate: None,
			refresh_route: "/auth/refresh",
		}
	}

	fn with_refresh_route(mut self, route: &'static str) -> Self {
		self.refresh_route = route;

		self
	}

	fn gated(mut self) -> (Self, Arc<Notify>) {
		let gate = Arc::new(Notify::new());

		self.gate = Some(gate.clone());

		(self, gate)
	}

	fn refresh_calls(&self) -> usize {
		self.state.lock().expect("Script state lock poisoned.").refresh_calls
	}

	fn seen(&self, path: &str) -> Vec<Option<String>> {
		self.state
			.lock()
			.expect("Script state lock poisoned.")
			.log
			.iter()
			.filter(|seen| seen.path == path)
			.map(|seen| seen.authorization.clone())
			.collect()
	}
}
impl GatewayHttpClient for ScriptedApi {
	type TransportError = ConnectionReset;

	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_, ConnectionReset> {
		let api = self.clone();

		Box::pin(async move {
			let authorization = request.header("authorization").map(str::to_owned);

			api.state
				.lock()
				.expect("Script state lock poisoned.")
				.log
				.push(Seen { path: request.path.clone(), authorization: authorization.clone() });

			if url.path().ends_with(api.refresh_route) {
				api.state.lock().expect("Script state lock poisoned.").refresh_calls += 1;

				if let Some(gate) = &api.gate {
					gate.notified().await;
				}

				let mut state = api.state.lock().expect("Script state lock poisoned.");

				return Ok(match state.refresh {
					RefreshScript::Issue(token) => {
						state.accepted = Some(token.to_owned());

						ApiResponse::new(
							200,
							format!(r#"{{"access_token":"{token}","token_type":"bearer"}}"#),
						)
					},
					RefreshScript::Deny => ApiResponse::new(
						401,
						r#"{"code":"http_error","message":"Refresh token is invalid"}"#,
					),
				});
			}

			match request.path.as_str() {
				"/broken" => return Err(ConnectionReset),
				"/missing" => return Ok(ApiResponse::new(404, r#"{"message":"Not found"}"#)),
				path if path.starts_with("/locked") => return Ok(ApiResponse::new(401, "")),
				_ => {},
			}

			let state = api.state.lock().expect("Script state lock poisoned.");
			let expected = state.accepted.as_ref().map(|token| format!("Bearer {token}"));

			if authorization.is_some() && authorization == expected {
				Ok(ApiResponse::new(200, format!(r#"{{"path":"{}"}}"#, request.path)))
			} else {
				Ok(ApiResponse::new(401, ""))
			}
		})
	}
}

fn build_gateway(api: &ScriptedApi, credential: Option<&str>) -> Gateway<ScriptedApi> {
	let config = GatewayConfig::new("http://shop.test/api/v1")
		.expect("Gateway config fixture should parse.");

	build_gateway_with(api, credential, config)
}

fn build_gateway_with(
	api: &ScriptedApi,
	credential: Option<&str>,
	config: GatewayConfig,
) -> Gateway<ScriptedApi> {
	let store = MemoryCredentialStore::default();

	store.replace(credential.map(BearerCredential::new));

	Gateway::with_http_client(config, api.clone()).with_store(Arc::new(store))
}

async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
	for _ in 0..5_000 {
		if condition() {
			return;
		}

		tokio::time::sleep(Duration::from_millis(1)).await;
	}

	panic!("Timed out waiting until {what}.");
}

fn bearer(token: &str) -> Option<String> {
	Some(format!("Bearer {token}"))
}

#[tokio::test]
async fn authorized_request_passes_through_without_refresh() {
	let api = ScriptedApi::new(Some("tok1"), RefreshScript::Issue("tok2"));
	let gateway = build_gateway(&api, Some("tok1"));
	let response =
		gateway.send(ApiRequest::get("/cart")).await.expect("Authorized request should succeed.");

	assert_eq!(response.status, 200);
	assert_eq!(api.seen("/cart"), vec![bearer("tok1")]);
	assert_eq!(api.refresh_calls(), 0);
	assert_eq!(gateway.refresh_metrics.retries(), 0);
}

#[tokio::test]
async fn expired_credential_is_refreshed_and_request_retried_once() {
	let api = ScriptedApi::new(None, RefreshScript::Issue("tok2"));
	let gateway = build_gateway(&api, Some("tok1"));
	let response = gateway
		.send(ApiRequest::get("/favorites"))
		.await
		.expect("Request should succeed after the refresh.");

	assert_eq!(response.status, 200);
	assert_eq!(api.seen("/favorites"), vec![bearer("tok1"), bearer("tok2")]);
	assert_eq!(api.refresh_calls(), 1);
	assert_eq!(gateway.credential().as_ref().map(BearerCredential::expose), Some("tok2"));
	assert!(!gateway.is_refreshing());
	assert_eq!(gateway.refresh_metrics.attempts(), 1);
	assert_eq!(gateway.refresh_metrics.successes(), 1);
	assert_eq!(gateway.refresh_metrics.retries(), 1);
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
	const CALLERS: usize = 5;

	let (api, gate) = ScriptedApi::new(None, RefreshScript::Issue("tok2")).gated();
	let gateway = build_gateway(&api, Some("tok1"));
	let handles = (0..CALLERS)
		.map(|idx| {
			let gateway = gateway.clone();

			tokio::spawn(async move { gateway.send(ApiRequest::get(format!("/orders/{idx}"))).await })
		})
		.collect::<Vec<_>>();

	wait_until("every caller is queued behind one refresh", || {
		api.refresh_calls() == 1 && gateway.pending_refresh_waiters() == CALLERS - 1
	})
	.await;

	assert!(gateway.is_refreshing());

	gate.notify_one();

	for handle in handles {
		let response = handle
			.await
			.expect("Caller task should not panic.")
			.expect("Every caller should succeed after the shared refresh.");

		assert_eq!(response.status, 200);
	}
	for idx in 0..CALLERS {
		assert_eq!(api.seen(&format!("/orders/{idx}")), vec![bearer("tok1"), bearer("tok2")]);
	}

	assert_eq!(api.refresh_calls(), 1);
	assert!(!gateway.is_refreshing());
	assert_eq!(gateway.pending_refresh_waiters(), 0);
	assert_eq!(gateway.refresh_metrics.attempts(), 1);
	assert_eq!(gateway.refresh_metrics.queued(), (CALLERS - 1) as u64);
	assert_eq!(gateway.refresh_metrics.retries(), CALLERS as u64);
}

#[tokio::test]
async fn caller_arriving_during_refresh_enqueues_and_retries_with_new_credential() {
	let (api, gate) = ScriptedApi::new(None, RefreshScript::Issue("tok2")).gated();
	let gateway = build_gateway(&api, Some("tok1"));
	let caller_a = {
		let gateway = gateway.clone();

		tokio::spawn(async move { gateway.send(ApiRequest::get("/cart")).await })
	};

	wait_until("caller A starts the refresh", || api.refresh_calls() == 1).await;

	let caller_b = {
		let gateway = gateway.clone();

		tokio::spawn(async move { gateway.send(ApiRequest::get("/notifications")).await })
	};

	wait_until("caller B is queued", || gateway.pending_refresh_waiters() == 1).await;

	assert_eq!(api.refresh_calls(), 1);

	gate.notify_one();

	caller_a.await.expect("Caller A should not panic.").expect("Caller A should succeed.");
	caller_b.await.expect("Caller B should not panic.").expect("Caller B should succeed.");

	assert_eq!(api.seen("/cart"), vec![bearer("tok1"), bearer("tok2")]);
	assert_eq!(api.seen("/notifications"), vec![bearer("tok1"), bearer("tok2")]);
	assert_eq!(api.refresh_calls(), 1);
}

#[tokio::test]
async fn second_denial_surfaces_without_another_refresh() {
	let api = ScriptedApi::new(None, RefreshScript::Issue("tok2"));
	let gateway = build_gateway(&api, Some("tok1"));
	let err = gateway
		.send(ApiRequest::get("/locked/admin"))
		.await
		.expect_err("A second 401 should surface to the caller.");

	assert!(matches!(&err, Error::Unauthorized { path, .. } if path == "/locked/admin"));
	assert_eq!(api.seen("/locked/admin"), vec![bearer("tok1"), bearer("tok2")]);
	assert_eq!(api.refresh_calls(), 1);
}

#[tokio::test]
async fn failed_refresh_clears_credential_and_resumes_waiters() {
	let (api, gate) = ScriptedApi::new(None, RefreshScript::Deny).gated();
	let gateway = build_gateway(&api, Some("tok1"));
	let caller_a = {
		let gateway = gateway.clone();

		tokio::spawn(async move { gateway.send(ApiRequest::get("/cart")).await })
	};

	wait_until("caller A starts the refresh", || api.refresh_calls() == 1).await;

	let caller_b = {
		let gateway = gateway.clone();

		tokio::spawn(async move { gateway.send(ApiRequest::get("/orders/my")).await })
	};

	wait_until("caller B is queued", || gateway.pending_refresh_waiters() == 1).await;
	gate.notify_one();

	let err_a = caller_a
		.await
		.expect("Caller A should not panic.")
		.expect_err("The refreshing caller should see the refresh failure.");
	let err_b = caller_b
		.await
		.expect("Caller B should not panic.")
		.expect_err("The queued caller should fail on its credential-less retry.");

	match &err_a {
		Error::RefreshFailed { source } =>
			assert!(matches!(&**source, Error::Unauthorized { path, body: Some(_) } if path == "/auth/refresh")),
		other => panic!("Unexpected error for caller A: {other:?}."),
	}

	assert!(err_b.is_unauthorized());
	assert!(gateway.credential().is_none());
	assert!(!gateway.is_refreshing());
	assert_eq!(api.seen("/orders/my"), vec![bearer("tok1"), None]);
	assert_eq!(api.seen("/cart"), vec![bearer("tok1")]);
	assert_eq!(api.refresh_calls(), 1);
	assert_eq!(gateway.refresh_metrics.failures(), 1);
}

#[tokio::test]
async fn refresh_endpoint_denial_is_not_recovered() {
	let api = ScriptedApi::new(None, RefreshScript::Deny);
	let gateway = build_gateway(&api, Some("tok1"));
	let err = gateway
		.send(ApiRequest::post("/auth/refresh"))
		.await
		.expect_err("A denied refresh call should surface directly.");

	assert!(err.is_unauthorized());
	assert_eq!(api.refresh_calls(), 1);
	assert_eq!(gateway.refresh_metrics.attempts(), 0);
	assert_eq!(gateway.credential().as_ref().map(BearerCredential::expose), Some("tok1"));
}

#[tokio::test]
async fn custom_refresh_route_drives_recovery() {
	let api = ScriptedApi::new(None, RefreshScript::Deny).with_refresh_route("/session/renew");
	let endpoints = Endpoints { refresh: "/session/renew".into(), ..Default::default() };
	let config = GatewayConfig::new("http://shop.test/api/v1")
		.expect("Gateway config fixture should parse.")
		.with_endpoints(endpoints);
	let gateway = build_gateway_with(&api, Some("tok1"), config.clone());
	let err = gateway
		.send(ApiRequest::post("/session/renew"))
		.await
		.expect_err("A denied call to the configured refresh route should not recover.");

	assert!(err.is_unauthorized());
	assert_eq!(api.refresh_calls(), 1);
	assert_eq!(gateway.refresh_metrics.attempts(), 0);

	let renewing = ScriptedApi::new(None, RefreshScript::Issue("tok2"))
		.with_refresh_route("/session/renew");
	let gateway = build_gateway_with(&renewing, Some("tok1"), config);

	gateway.send(ApiRequest::get("/cart")).await.expect("Cart should load after the refresh.");

	assert_eq!(renewing.seen("/session/renew"), vec![bearer("tok1")]);
	assert!(renewing.seen("/auth/refresh").is_empty());
	assert_eq!(renewing.seen("/cart"), vec![bearer("tok1"), bearer("tok2")]);
	assert_eq!(gateway.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn other_failures_propagate_unchanged() {
	let api = ScriptedApi::new(Some("tok1"), RefreshScript::Issue("tok2"));
	let gateway = build_gateway(&api, Some("tok1"));
	let missing = gateway
		.send(ApiRequest::get("/missing"))
		.await
		.expect_err("A 404 should surface to the caller.");

	assert!(matches!(&missing, Error::Status { status: 404, .. }));
	assert_eq!(missing.status(), Some(404));

	let broken = gateway
		.send(ApiRequest::get("/broken"))
		.await
		.expect_err("Transport failures should surface to the caller.");

	assert!(matches!(broken, Error::Transport(_)));
	assert_eq!(api.refresh_calls(), 0);
}

#[tokio::test]
async fn explicit_refresh_joins_in_flight_refresh() {
	let (api, gate) = ScriptedApi::new(None, RefreshScript::Issue("tok2")).gated();
	let gateway = build_gateway(&api, Some("tok1"));
	let caller = {
		let gateway = gateway.clone();

		tokio::spawn(async move { gateway.send(ApiRequest::get("/cart")).await })
	};

	wait_until("the caller starts the refresh", || api.refresh_calls() == 1).await;

	let explicit = {
		let gateway = gateway.clone();

		tokio::spawn(async move { gateway.refresh().await })
	};

	wait_until("the explicit refresh is queued", || gateway.pending_refresh_waiters() == 1).await;
	gate.notify_one();

	caller.await.expect("Caller should not panic.").expect("Caller should succeed.");

	let credential = explicit
		.await
		.expect("Explicit refresh should not panic.")
		.expect("Explicit refresh should report the shared credential.");

	assert_eq!(credential.expose(), "tok2");
	assert_eq!(api.refresh_calls(), 1);
}
