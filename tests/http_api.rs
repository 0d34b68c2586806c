//! HTTP API tests.
//!
//! The router runs over the in-memory repository and session store, seeded
//! with the demo catalog, and is driven with `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fake::{
    faker::{internet::en::SafeEmail, name::en::Name},
    Fake,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use movie_booking::{
    app,
    error::SEAT_TAKEN_MESSAGE,
    repository::{MemoryRepository, Repository},
    services::seed::{seed_demo_data, DEMO_EMAIL, DEMO_PASSWORD},
    sessions::MemorySessionStore,
    AppState,
};

const BCRYPT_COST: u32 = 4;

async fn test_app() -> Router {
    let repo: Arc<dyn Repository> = Arc::new(MemoryRepository::new());
    seed_demo_data(repo.as_ref(), BCRYPT_COST).await.unwrap();
    let sessions = Arc::new(MemorySessionStore::new(3600));
    app(AppState::new(repo, sessions, BCRYPT_COST))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn register_and_login(app: &Router) -> String {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    let (status, _) = send(
        app,
        post_json(
            "/api/auth/register",
            None,
            json!({ "name": name, "email": email, "password": "hunter22" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, &email, "hunter22").await
}

async fn first_showtime(app: &Router) -> Value {
    let (_, movies) = send(app, get("/api/movies", None)).await;
    let movie_id = movies[0]["id"].as_i64().unwrap();
    let (_, detail) = send(app, get(&format!("/api/movies/{movie_id}"), None)).await;
    detail["showtimes"][0].clone()
}

#[tokio::test]
async fn health_and_banner() {
    let app = test_app().await;
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn catalog_lists_seeded_movies_and_seat_map() {
    let app = test_app().await;

    let (status, movies) = send(&app, get("/api/movies", None)).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = movies
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Interstellar", "Inception", "The Dark Knight"]);

    let showtime = first_showtime(&app).await;
    let id = showtime["id"].as_i64().unwrap();
    let (status, detail) = send(&app, get(&format!("/api/showtimes/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["seat_count"], 40);
    assert_eq!(detail["free_seats"], 40);
    assert_eq!(detail["rows"].as_array().unwrap().len(), 5);
    assert_eq!(detail["rows"][4]["seats"][7]["label"], "E8");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = test_app().await;

    let (status, body) = send(&app, get("/api/movies/999", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, get("/api/showtimes/999", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_scenario_then_conflict_on_rebook() {
    let app = test_app().await;
    let token = login(&app, DEMO_EMAIL, DEMO_PASSWORD).await;
    let showtime = first_showtime(&app).await;
    let id = showtime["id"].as_i64().unwrap();
    let price = showtime["price_cents"].as_i64().unwrap();

    let (status, booking) = send(
        &app,
        post_json(
            &format!("/api/showtimes/{id}/bookings"),
            Some(&token),
            json!({ "seats": [3, 4] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{booking}");
    assert_eq!(booking["seats"], json!([3, 4]));
    assert_eq!(booking["seat_labels"], json!(["A3", "A4"]));
    assert_eq!(booking["total_price_cents"], 2 * price);

    let other = register_and_login(&app).await;
    let (status, body) = send(
        &app,
        post_json(
            &format!("/api/showtimes/{id}/bookings"),
            Some(&other),
            json!({ "seats": [3] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], SEAT_TAKEN_MESSAGE);
    assert_eq!(body["retryable"], true);

    let (_, taken) = send(&app, get(&format!("/api/showtimes/{id}/seats"), None)).await;
    assert_eq!(taken["taken"], json!([3, 4]));

    let (status, mine) = send(&app, get("/api/bookings", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (_, theirs) = send(&app, get("/api/bookings", Some(&other))).await;
    assert!(theirs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_selections_are_rejected() {
    let app = test_app().await;
    let token = login(&app, DEMO_EMAIL, DEMO_PASSWORD).await;
    let id = first_showtime(&app).await["id"].as_i64().unwrap();
    let uri = format!("/api/showtimes/{id}/bookings");

    for seats in [json!([]), json!([0]), json!([41]), json!([2, 2])] {
        let (status, body) = send(
            &app,
            post_json(&uri, Some(&token), json!({ "seats": seats })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "seats {seats}");
        assert_eq!(body["code"], "INVALID_INPUT");
    }
}

#[tokio::test]
async fn malformed_bodies_and_paths_are_invalid_input() {
    let app = test_app().await;
    let token = login(&app, DEMO_EMAIL, DEMO_PASSWORD).await;
    let id = first_showtime(&app).await["id"].as_i64().unwrap();
    let uri = format!("/api/showtimes/{id}/bookings");

    for body in [
        json!({ "seats": [4294967296u64] }),
        json!({ "seats": [-3000000000i64] }),
        json!({ "seats": "A1" }),
        json!({}),
    ] {
        let (status, response) = send(&app, post_json(&uri, Some(&token), body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(response["code"], "INVALID_INPUT");
        assert_eq!(response["retryable"], false);
    }

    let (status, response) = send(
        &app,
        post_json("/api/showtimes/abc/bookings", Some(&token), json!({ "seats": [1] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "INVALID_INPUT");

    let (status, response) = send(&app, get("/api/movies/not-a-number", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "INVALID_INPUT");

    let (_, taken) = send(&app, get(&format!("/api/showtimes/{id}/seats"), None)).await;
    assert_eq!(taken["taken"], json!([]));
}

#[tokio::test]
async fn booking_requires_a_session() {
    let app = test_app().await;
    let id = first_showtime(&app).await["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        post_json(
            &format!("/api/showtimes/{id}/bookings"),
            None,
            json!({ "seats": [1] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, get("/api/bookings", Some("forged-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_is_accepted_and_logout_revokes_it() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD }),
        ))
        .await
        .unwrap();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let with_cookie = |method: &str, uri: &str| {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie.clone())
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(&app, with_cookie("GET", "/api/bookings")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, with_cookie("POST", "/api/auth/logout")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, with_cookie("GET", "/api/bookings")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_validates_and_rejects_duplicates() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/register",
            None,
            json!({ "name": "", "email": "not-an-email", "password": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/register",
            None,
            json!({ "name": "Someone", "email": " DEMO@example.com ", "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["retryable"], false);

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            json!({ "email": DEMO_EMAIL, "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
