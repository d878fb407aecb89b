mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};

use crate::api::{DynAPI, API};
use crate::error::{server_error, Error};
use crate::server::handlers::{health, rides};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/health", get(health::check))
        .route("/rides", get(rides::list).post(rides::create))
        .route("/rides/:id", get(rides::find))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let app = router(Arc::new(api));

    let server = axum::Server::try_bind(&addr).map_err(|err| {
        tracing::error!(%addr, error = %err, "failed to bind");
        server_error()
    })?;

    tracing::info!("listening on {}", addr);

    server.serve(app.into_make_service()).await.map_err(|err| {
        tracing::error!(error = %err, "server error");
        server_error()
    })
}

#[cfg(test)]
mod support {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::db::{MemoryStore, SqliteStore};
    use crate::engine::Engine;

    pub fn memory_app() -> Router {
        super::router(Arc::new(Engine::new(Arc::new(MemoryStore::new()))))
    }

    pub async fn sqlite_app() -> Router {
        let store = SqliteStore::new("sqlite::memory:", 1).await.unwrap();
        super::router(Arc::new(Engine::new(Arc::new(store))))
    }

    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();

        (status, content_type, body.to_vec())
    }

    pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, _, body) = send(app, request).await;

        (status, serde_json::from_slice(&body).unwrap())
    }

    pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _, body) = send(app, request).await;

        (status, serde_json::from_slice(&body).unwrap())
    }

    pub fn ride_body() -> Value {
        serde_json::json!({
            "start_lat": -6.188225,
            "start_long": 106.698526,
            "end_lat": -6.188153,
            "end_long": 106.738628,
            "rider_name": "Mychael",
            "driver_name": "Go",
            "driver_vehicle": "Honda Beat",
        })
    }

    pub fn error_body(code: &str, message: &str) -> Value {
        serde_json::json!({ "error_code": code, "message": message })
    }
}

#[test]
fn health_is_plain_text() {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use support::{memory_app, send};
    use tokio_test::block_on;

    let app = memory_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, content_type, body) = block_on(send(&app, request));

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(body, b"Healthy");
}

#[test]
fn create_ride_validation_errors() {
    use crate::validation::{
        DRIVER_NAME_MESSAGE, DRIVER_VEHICLE_MESSAGE, END_COORDINATES_MESSAGE, RIDER_NAME_MESSAGE,
        START_COORDINATES_MESSAGE,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use support::{error_body, get, memory_app, post_json, ride_body};
    use tokio_test::block_on;

    let app = memory_app();

    let cases = [
        ("start_lat", json!(1000), START_COORDINATES_MESSAGE),
        ("start_long", json!(1000), START_COORDINATES_MESSAGE),
        ("end_lat", json!(1000), END_COORDINATES_MESSAGE),
        ("end_long", json!(1000), END_COORDINATES_MESSAGE),
        ("rider_name", json!(null), RIDER_NAME_MESSAGE),
        ("driver_name", json!(""), DRIVER_NAME_MESSAGE),
        ("driver_vehicle", json!(7), DRIVER_VEHICLE_MESSAGE),
    ];

    for (field, value, message) in cases {
        let mut body = ride_body();
        body[field] = value;

        let (status, body) = block_on(post_json(&app, "/rides", body));

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", field);
        assert_eq!(body, error_body("VALIDATION_ERROR", message));
    }

    let (status, _) = block_on(get(&app, "/rides"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn create_ride_rejects_malformed_body() {
    use crate::server::handlers::rides::BODY_MESSAGE;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use support::{error_body, memory_app, send};
    use tokio_test::block_on;

    let app = memory_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/rides")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, _, body) = block_on(send(&app, request));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
        error_body("VALIDATION_ERROR", BODY_MESSAGE)
    );
}

#[test]
fn create_ride_requires_a_json_object() {
    use crate::server::handlers::rides::BODY_MESSAGE;
    use axum::http::StatusCode;
    use serde_json::json;
    use support::{error_body, get, memory_app, post_json};
    use tokio_test::block_on;

    let app = memory_app();

    let bodies = [
        json!([10, 10, 11, 11, "Mychael", "Go", "Honda Beat"]),
        json!("Mychael"),
        json!(42),
        json!(null),
    ];

    for body in bodies {
        let (status, response) = block_on(post_json(&app, "/rides", body.clone()));

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(response, error_body("VALIDATION_ERROR", BODY_MESSAGE));
    }

    let (status, _) = block_on(get(&app, "/rides"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn create_then_fetch_through_sqlite() {
    use axum::http::StatusCode;
    use serde_json::json;
    use support::{get, post_json, ride_body, sqlite_app};
    use tokio_test::block_on;

    block_on(async {
        let app = sqlite_app().await;

        let (status, created) = post_json(&app, "/rides", ride_body()).await;
        assert_eq!(status, StatusCode::OK);

        let rides = created.as_array().unwrap();
        assert_eq!(rides.len(), 1);

        let ride = &rides[0];
        assert_eq!(ride["rideID"], json!(1));
        assert_eq!(ride["startLat"], json!(-6.188225));
        assert_eq!(ride["startLong"], json!(106.698526));
        assert_eq!(ride["endLat"], json!(-6.188153));
        assert_eq!(ride["endLong"], json!(106.738628));
        assert_eq!(ride["riderName"], json!("Mychael"));
        assert_eq!(ride["driverName"], json!("Go"));
        assert_eq!(ride["driverVehicle"], json!("Honda Beat"));
        assert!(ride["created"].is_string());

        let (status, found) = get(&app, "/rides/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found, created);
    });
}

#[test]
fn list_rides_through_sqlite() {
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use support::{error_body, get, post_json, ride_body, sqlite_app};
    use tokio_test::block_on;

    block_on(async {
        let app = sqlite_app().await;

        let (status, body) = get(&app, "/rides").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, error_body("RIDES_NOT_FOUND_ERROR", "Could not find any rides"));

        for n in 0..12 {
            let mut body = ride_body();
            body["rider_name"] = json!(format!("rider {}", n));
            let (status, _) = post_json(&app, "/rides", body).await;
            assert_eq!(status, StatusCode::OK);
        }

        let ids = |body: &Value| {
            body.as_array()
                .unwrap()
                .iter()
                .map(|ride| ride["rideID"].as_i64().unwrap())
                .collect::<Vec<_>>()
        };

        let (status, body) = get(&app, "/rides").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), (1..=10).collect::<Vec<_>>());

        let (_, body) = get(&app, "/rides?page=1&size=4").await;
        assert_eq!(ids(&body), vec![1, 2, 3, 4]);

        let (_, body) = get(&app, "/rides?page=3&size=5").await;
        assert_eq!(ids(&body), vec![11, 12]);

        let (status, _) = get(&app, "/rides?page=4&size=5").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    });
}

#[test]
fn list_rides_rejects_invalid_pagination() {
    use crate::validation::{PAGE_MESSAGE, SIZE_MESSAGE};
    use axum::http::StatusCode;
    use support::{error_body, get, memory_app};
    use tokio_test::block_on;

    let app = memory_app();

    let cases = [
        ("/rides?page=0&size=10", PAGE_MESSAGE),
        ("/rides?page=1&size=0", SIZE_MESSAGE),
        ("/rides?page=0&size=0", PAGE_MESSAGE),
        ("/rides?page=two&size=10", PAGE_MESSAGE),
        ("/rides?page=1&size=2.5", SIZE_MESSAGE),
        ("/rides?size=10", PAGE_MESSAGE),
        ("/rides?page=1", SIZE_MESSAGE),
        ("/rides?page=1&size=1&size=2", SIZE_MESSAGE),
        ("/rides?page=1&page=2&size=1", PAGE_MESSAGE),
    ];

    for (uri, message) in cases {
        let (status, body) = block_on(get(&app, uri));

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, error_body("VALIDATION_ERROR", message));
    }
}

#[test]
fn find_ride_errors() {
    use crate::validation::ID_MESSAGE;
    use axum::http::StatusCode;
    use support::{error_body, get, sqlite_app};
    use tokio_test::block_on;

    block_on(async {
        let app = sqlite_app().await;

        let (status, body) = get(&app, "/rides/999999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, error_body("RIDES_NOT_FOUND_ERROR", "Could not find any rides"));

        let (status, body) = get(&app, "/rides/99999999999999999999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, error_body("RIDES_NOT_FOUND_ERROR", "Could not find any rides"));

        let (status, body) = get(&app, "/rides/3'%20OR%20'3=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, error_body("VALIDATION_ERROR", ID_MESSAGE));
    });
}

#[test]
fn injected_rider_name_is_stored_verbatim() {
    use axum::http::StatusCode;
    use serde_json::json;
    use support::{get, post_json, ride_body, sqlite_app};
    use tokio_test::block_on;

    block_on(async {
        let app = sqlite_app().await;

        let mut body = ride_body();
        body["rider_name"] = json!("Mychael's OR '1=1");
        let (status, created) = post_json(&app, "/rides", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created[0]["riderName"], json!("Mychael's OR '1=1"));

        let (_, listed) = get(&app, "/rides").await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    });
}
