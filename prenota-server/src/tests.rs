use std::time::Duration;

use axum::{
    body::Body,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, COOKIE, PRAGMA, SET_COOKIE},
        Request, StatusCode,
    },
    response::Response,
};
use http_body_util::BodyExt;
use prenota_core::create_token;
use prenota_gateway::GatewayConfig;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use crate::{router, ServerConfig, ServerContext};

const SECRET: &str = "session-secret";
const PASSWORD: &str = "arrosticini";

async fn setup() -> (MockServer, axum::Router) {
    let server = MockServer::start().await;

    let config = ServerConfig {
        gateway: GatewayConfig {
            script_url: Some(format!("{}/exec", server.uri())),
            script_secret: Some("shh".into()),
            booking_url: Some(format!("{}/intake", server.uri())),
            timeout: Duration::from_millis(500),
        },
        session_secret: Some(SECRET.into()),
        admin_password: Some(PASSWORD.into()),
        ..Default::default()
    };

    (server, router(ServerContext::new(config)))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin(mut request: Request<Body>) -> Request<Body> {
    let cookie = format!("admin_session={}", create_token(SECRET));
    request
        .headers_mut()
        .insert(COOKIE, cookie.parse().unwrap());

    request
}

async fn body_of(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn valid_booking() -> Value {
    json!({
        "nome": "Mario",
        "telefono": "3331234567",
        "tipo": "ritiro",
        "data": "30/12/2025",
        "ora": "12.30",
        "scatola50": 2,
    })
}

async fn mount_settings(server: &MockServer, open: bool) {
    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(body_partial_json(json!({ "action": "getSettings" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "settings": { "bookings_open": open },
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_delivery_without_address_is_refused_locally() {
    let (server, app) = setup().await;

    let mut booking = valid_booking();
    booking["tipo"] = json!("consegna");

    let response = app.oneshot(post("/api/bookings", booking)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_of(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Per la consegna serve l'indirizzo.");

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_forwarded_when_open() {
    let (server, app) = setup().await;
    mount_settings(&server, true).await;

    Mock::given(method("POST"))
        .and(path("/intake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let response = app
        .oneshot(post("/api/bookings", valid_booking()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_of(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], "Ricevuto ✅ Il locale confermerà appena possibile.");
}

#[tokio::test]
async fn test_booking_refused_when_closed() {
    let (server, app) = setup().await;
    mount_settings(&server, false).await;

    Mock::given(method("POST"))
        .and(path("/intake"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = app
        .oneshot(post("/api/bookings", valid_booking()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_of(response).await;
    assert_eq!(body["error"], "Prenotazioni momentaneamente chiuse.");
}

#[tokio::test]
async fn test_responses_are_not_cached() {
    let (_server, app) = setup().await;

    let request = Request::get("/api/bookings").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CACHE_CONTROL],
        "no-store, no-cache, must-revalidate"
    );
    assert_eq!(response.headers()[PRAGMA], "no-cache");
}

#[tokio::test]
async fn test_admin_requires_session() {
    let (server, app) = setup().await;

    let request = Request::get("/api/admin/bookings").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::get("/api/admin/bookings")
        .header(COOKIE, "admin_session=forged.token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_session_secret() {
    let config = ServerConfig {
        admin_password: Some(PASSWORD.into()),
        ..Default::default()
    };
    let app = router(ServerContext::new(config));

    let request = Request::get("/api/admin/session").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_of(response).await;
    assert_eq!(body["error"], "PRENOTA_SESSION_SECRET mancante");
}

#[tokio::test]
async fn test_login_and_logout() {
    let (_server, app) = setup().await;

    let response = app
        .clone()
        .oneshot(post("/api/admin/login", json!({ "password": "wrong" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(body_of(response).await["error"], "Password errata");

    let response = app
        .clone()
        .oneshot(post("/api/admin/login", json!({ "password": PASSWORD })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));

    let pair = set_cookie.split(';').next().unwrap().to_string();
    let request = Request::get("/api/admin/session")
        .header(COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post("/api/admin/logout", json!({})))
        .await
        .unwrap();
    let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("admin_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_invalid_status_sends_nothing() {
    let (server, app) = setup().await;

    let request = admin(post(
        "/api/admin/bookings",
        json!({ "stato": "PERSA", "timestampISO": "2025-12-01T10:00:00.000Z" }),
    ));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_status_update_falls_back_to_get() {
    let (server, app) = setup().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/exec"))
        .and(query_param("action", "updateStatus"))
        .and(query_param("stato", "CONFERMATA"))
        .and(query_param("telefono", "3331234567"))
        .and(query_param("dataISO", "2025-12-30"))
        .and(query_param("ora", "12:30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let request = admin(post(
        "/api/admin/bookings",
        json!({
            "action": "updateStatus",
            "stato": "confermata",
            "telefono": 3331234567u64,
            "dataISO": "2025-12-30",
            "ora": "12:30",
        }),
    ));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_of(response).await;
    assert_eq!(body["via"], "get");
}

#[tokio::test]
async fn test_toggle_bookings() {
    let (server, app) = setup().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(body_partial_json(json!({ "action": "setBookingsOpen", "value": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "settings": { "bookings_open": "FALSE" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = admin(post("/api/admin/settings", json!({ "open": "no" })));
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_of(response).await["bookings_open"], false);

    let request = admin(post("/api/admin/settings", json!({ "note": "nessun valore" })));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_unauthorized_maps_to_401() {
    let (server, app) = setup().await;

    Mock::given(method("GET"))
        .and(path("/exec"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "Unauthorized" })),
        )
        .mount(&server)
        .await;

    let request = admin(Request::get("/api/admin/bookings").body(Body::empty()).unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_of(response).await;
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["detail"]["ok"], false);
}

#[tokio::test]
async fn test_api_docs_served() {
    let (_server, app) = setup().await;

    let request = Request::get("/api.json").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_of(response).await;
    assert!(body["paths"]["/api/admin/bookings"].is_object());
    assert!(body["components"]["securitySchemes"]["AdminSession"].is_object());
}

#[tokio::test]
async fn test_booking_needs_script_endpoint_for_open_check() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/intake"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = ServerConfig {
        gateway: GatewayConfig {
            booking_url: Some(format!("{}/intake", server.uri())),
            ..Default::default()
        },
        ..Default::default()
    };
    let app = router(ServerContext::new(config));

    let response = app
        .oneshot(post("/api/bookings", valid_booking()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_of(response).await;
    assert_eq!(body["error"], "PRENOTA_SCRIPT_URL mancante");
}
