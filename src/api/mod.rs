//! REST surface over the core.
//!
//! Handlers resolve the caller with [`auth::Principal`], call one core operation
//! and wrap the result in the [`response`] envelope. Errors become responses
//! through the `IntoResponse` impl in [`error`].

use crate::{config::server::create_cors_layer, core::context::CoreContext};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Request principal extraction
pub mod auth;
/// HTTP status and body mapping for errors
pub mod error;
/// Enveloped JSON and query extractors
pub mod extract;
/// Endpoint handlers
pub mod handlers;
/// Response envelope helpers
pub mod response;

use handlers::{halls, health, movies, purchases, sessions, users};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Core handles
    pub core: CoreContext,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/me", get(users::me))
        .route("/movies", get(movies::list_movies).post(movies::create_movie))
        .route(
            "/movies/:id",
            get(movies::get_movie)
                .put(movies::update_movie)
                .delete(movies::delete_movie),
        )
        .route("/halls", get(halls::list_halls).post(halls::create_hall))
        .route(
            "/halls/:id",
            get(halls::get_hall)
                .put(halls::update_hall)
                .delete(halls::delete_hall),
        )
        .route(
            "/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/sessions/today", get(sessions::todays_sessions))
        .route(
            "/sessions/:id",
            get(sessions::get_session)
                .put(sessions::update_session)
                .delete(sessions::delete_session),
        )
        .route("/sessions/:id/seats", get(sessions::seats))
        .route("/sessions/:id/purchases", post(purchases::create_purchase))
        .route("/purchases", get(purchases::my_purchases))
        .route(
            "/users/:user_id/purchases/:purchase_id",
            get(purchases::get_purchase),
        )
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{errors::Result, test_utils::*};
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn app() -> Result<(BoxOfficeFixture, Router)> {
        let fixture = BoxOfficeFixture::new().await?;
        let app = router(AppState {
            core: fixture.ctx.clone(),
        });
        Ok((fixture, app))
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let (_fixture, app) = app().await?;
        let (status, body) = call(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_me_requires_token() -> Result<()> {
        let (_fixture, app) = app().await?;

        let (status, body) = call(&app, Method::GET, "/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "AUTH_ERROR");

        let (status, _) = call(&app, Method::GET, "/me", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(&app, Method::GET, "/me", Some("customer-token"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "customer");
        assert_eq!(body["data"]["role"], "customer");
        assert_eq!(body["data"]["wallet"], "10000.00");
        Ok(())
    }

    #[tokio::test]
    async fn test_hall_permissions() -> Result<()> {
        let (_fixture, app) = app().await?;
        let payload = json!({ "name": "Red Hall", "seats": 50 });

        let (status, _) = call(&app, Method::POST, "/halls", None, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            &app,
            Method::POST,
            "/halls",
            Some("customer-token"),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "PERMISSION_DENIED");

        let (status, body) =
            call(&app, Method::POST, "/halls", Some("staff-token"), Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["seats"], 50);

        let (status, _) = call(&app, Method::GET, "/halls", Some("customer-token"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(
            &app,
            Method::POST,
            "/halls",
            Some("staff-token"),
            Some(json!({ "name": "Tiny", "seats": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        Ok(())
    }

    #[tokio::test]
    async fn test_session_conflict_over_http() -> Result<()> {
        let (fixture, app) = app().await?;
        let showing = fixture.scenario_session().await?;

        let overlapping = json!({
            "hall_id": showing.hall_id,
            "movie_id": showing.movie_id,
            "start_date": "2025-01-05",
            "end_date": "2025-01-08",
            "start_time": "19:00:00",
            "end_time": "21:00:00",
            "price": "12.50",
        });
        let (status, body) = call(
            &app,
            Method::POST,
            "/sessions",
            Some("staff-token"),
            Some(overlapping),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["details"]["session_id"], showing.id);

        let later = json!({
            "hall_id": showing.hall_id,
            "movie_id": showing.movie_id,
            "start_date": "2025-01-11",
            "end_date": "2025-01-15",
            "start_time": "19:00:00",
            "end_time": "21:00:00",
            "price": "12.50",
        });
        let (status, body) =
            call(&app, Method::POST, "/sessions", Some("staff-token"), Some(later)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["price"], "12.50");
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_flow_over_http() -> Result<()> {
        let (fixture, app) = app().await?;
        let showing = fixture.scenario_session().await?;
        let uri = format!("/sessions/{}/purchases", showing.id);

        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            Some("customer-token"),
            Some(json!({ "quantity": 51, "show_date": "2025-01-05" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_CAPACITY");
        assert_eq!(body["error"]["details"]["available"], 50);

        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            Some("customer-token"),
            Some(json!({ "quantity": 2, "show_date": "2025-01-05" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["total"], "20.00");
        let purchase_id = body["data"]["purchase"]["id"].as_i64().unwrap();

        let (status, body) = call(
            &app,
            Method::GET,
            &format!("/sessions/{}/seats?date=2025-01-05", showing.id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["availability"][0]["free_seats"], 48);

        let (status, body) =
            call(&app, Method::GET, "/purchases", Some("customer-token"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], "20.00");

        let detail = format!("/users/{}/purchases/{purchase_id}", fixture.customer_id);
        let (status, _) = call(&app, Method::GET, &detail, Some("staff-token"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            Method::DELETE,
            &format!("/sessions/{}", showing.id),
            Some("staff-token"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        Ok(())
    }

    #[tokio::test]
    async fn test_todays_sessions_over_http() -> Result<()> {
        let (fixture, app) = app().await?;
        let showing = fixture.scenario_session().await?;

        let (status, body) = call(
            &app,
            Method::GET,
            &format!("/sessions/today?hall={}&start_time=17:00:00", showing.hall_id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], showing.id);

        let (status, body) = call(
            &app,
            Method::GET,
            "/sessions/today?end_time=17:00:00",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_bodies_use_error_envelope() -> Result<()> {
        let (fixture, app) = app().await?;
        let showing = fixture.scenario_session().await?;

        let (status, body) = call(
            &app,
            Method::POST,
            "/halls",
            Some("staff-token"),
            Some(json!({ "name": "Blue Hall", "seats": "many" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/sessions/{}/purchases", showing.id),
            Some("customer-token"),
            Some(json!({ "quantity": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/movies")
            .header(header::AUTHORIZATION, "Token staff-token")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) =
            call(&app, Method::GET, "/sessions/today?hall=red", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        Ok(())
    }

    #[tokio::test]
    async fn test_seats_outside_run_are_rejected() -> Result<()> {
        let (fixture, app) = app().await?;
        let showing = fixture.scenario_session().await?;

        for date in ["2025-01-11", "2024-12-31"] {
            let uri = format!("/sessions/{}/seats?date={date}", showing.id);
            let (status, body) = call(&app, Method::GET, &uri, None, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }

        let uri = format!("/sessions/{}/seats?date=2025-01-10", showing.id);
        let (status, body) = call(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["availability"][0]["free_seats"], 50);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() -> Result<()> {
        let (_fixture, app) = app().await?;
        let (status, body) = call(&app, Method::GET, "/sessions/404", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        Ok(())
    }
}
