//! Integrationstests fuer die Verzeichnis-Endpunkte
//!
//! Fahren den Router ohne Netzwerk via `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use fluesterkasten_server::{config::ServerConfig, router, AppState};

fn app() -> axum::Router {
    router(AppState::neu(ServerConfig::default()))
}

fn put_request(username: &str, public_key: &str) -> Request<Body> {
    let body = serde_json::json!({ "username": username, "public_key": public_key });
    Request::builder()
        .method("PUT")
        .uri("/public_key")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn hinterlegen_und_abrufen() {
    let app = app();

    let antwort = app
        .clone()
        .oneshot(put_request("alice", "-----BEGIN PUBLIC KEY-----\nQUJD\n-----END PUBLIC KEY-----\n"))
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::OK);
    assert_eq!(json_body(antwort).await["message"], "Public key saved");

    let antwort = app
        .oneshot(
            Request::builder()
                .uri("/public_key/alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::OK);

    let body = json_body(antwort).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(
        body["public_key"],
        "-----BEGIN PUBLIC KEY-----\nQUJD\n-----END PUBLIC KEY-----\n"
    );
}

#[tokio::test]
async fn unbekannter_benutzer_ist_404() {
    let antwort = app()
        .oneshot(
            Request::builder()
                .uri("/public_key/niemand")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(antwort.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(antwort).await["detail"], "Public key not found");
}

#[tokio::test]
async fn ungueltiger_benutzername_ist_400() {
    let antwort = app()
        .oneshot(put_request("al ice", "egal"))
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn erneutes_hinterlegen_ueberschreibt() {
    let app = app();

    app.clone().oneshot(put_request("alice", "alt")).await.unwrap();
    let antwort = app.clone().oneshot(put_request("alice", "neu")).await.unwrap();
    assert_eq!(antwort.status(), StatusCode::OK);

    let antwort = app
        .oneshot(
            Request::builder()
                .uri("/public_key/alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(antwort).await["public_key"], "neu");
}

#[tokio::test]
async fn health_endpunkt() {
    let antwort = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::OK);
    assert_eq!(json_body(antwort).await["status"], "ok");
}
