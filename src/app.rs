use axum::{
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::database::ClassRepository;
use crate::handlers;
use crate::middleware::{oauth_validation_middleware, OAuthGateway};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ClassRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn ClassRepository>) -> Self {
        Self { repository }
    }
}

/// Full router: public routes, class routes, then the OAuth gate and the
/// global layers.
pub fn app(state: AppState, gateway: Arc<OAuthGateway>, api: &ApiConfig) -> Router {
    let mut router = Router::new()
        // Public
        .merge(public_routes())
        // Protected API
        .merge(class_routes())
        .merge(exam_routes())
        .with_state(state)
        // Runs before every route; allow-listed paths pass straight through
        .layer(middleware::from_fn_with_state(gateway, oauth_validation_middleware));

    if api.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/v1/health", get(public::health))
}

fn class_routes() -> Router<AppState> {
    use handlers::protected as p;

    Router::new()
        .route("/api/v1/classes", get(p::class_list).post(p::class_create))
        .route(
            "/api/v1/classes/:id",
            get(p::class_get)
                .put(p::class_put)
                .patch(p::class_patch)
                .delete(p::class_delete),
        )
}

fn exam_routes() -> Router<AppState> {
    use handlers::protected as p;

    Router::new()
        .route(
            "/api/v1/classes/:id/exams",
            get(p::exam_list).post(p::exam_create),
        )
        .route(
            "/api/v1/classes/:id/exams/:examId",
            get(p::exam_get)
                .put(p::exam_put)
                .patch(p::exam_patch)
                .delete(p::exam_delete),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{InMemoryClassRepository, RepositoryError};
    use crate::middleware::{TokenValidator, ValidationOutcome};
    use crate::models::Class;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderValue, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct AcceptAll;

    #[async_trait]
    impl TokenValidator for AcceptAll {
        async fn validate(&self, _authorization: HeaderValue) -> ValidationOutcome {
            ValidationOutcome::Valid
        }
    }

    /// A store whose server is gone.
    struct Unreachable;

    #[async_trait]
    impl ClassRepository for Unreachable {
        async fn get_all(&self) -> Result<Vec<Class>, RepositoryError> {
            Err(RepositoryError::Unavailable("no server".into()))
        }
        async fn get_by_id(&self, _id: &str) -> Result<Option<Class>, RepositoryError> {
            Err(RepositoryError::Unavailable("no server".into()))
        }
        async fn create(&self, _class: &Class) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("no server".into()))
        }
        async fn update(&self, _class: &Class) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("no server".into()))
        }
        async fn delete(&self, _id: &str) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("no server".into()))
        }
        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("no server".into()))
        }
        fn backend_name(&self) -> &'static str {
            "mongo"
        }
        fn database_name(&self) -> &str {
            "classes"
        }
    }

    fn router_with(repository: Arc<dyn ClassRepository>) -> Router {
        let gateway = Arc::new(OAuthGateway::new(
            crate::config::OAuthConfig::default().excluded_prefixes,
            Arc::new(AcceptAll),
        ));
        let api = ApiConfig {
            enable_cors: false,
            enable_request_logging: false,
            log_filter: "info".into(),
        };
        app(AppState::new(repository), gateway, &api)
    }

    fn router() -> Router {
        router_with(Arc::new(InMemoryClassRepository::new()))
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, "Bearer a.b.c");
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn create_then_patch_class() {
        let app = router();

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/classes",
            Some(json!({
                "classNumber": "101",
                "year": 2025,
                "semester": 1,
                "schedule": "Manha",
                "course": {"id": "course1"},
                "exam": {"name": "P1", "date": "2025-10-01T19:00:00Z", "weight": 40}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        assert!(!created["exams"][0]["id"].as_str().unwrap().is_empty());

        let (status, patched) = send(
            &app,
            Method::PATCH,
            &format!("/api/v1/classes/{}", id),
            Some(json!({"Year": 2026, "Schedule": "Noite", "Semester": 2, "room": "B1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["year"], 2026);
        assert_eq!(patched["semester"], 2);
        assert_eq!(patched["schedule"], "Noite");
        assert_eq!(patched["id"], created["id"]);
        assert_eq!(patched["course"], created["course"]);
        assert_eq!(patched["exams"], created["exams"]);
    }

    #[tokio::test]
    async fn missing_bodies_are_bad_requests() {
        let app = router();

        let (status, _) = send(&app, Method::POST, "/api/v1/classes", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::POST, "/api/v1/classes", Some(Value::Null)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::PATCH, "/api/v1/classes/x", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_class_is_not_found() {
        let app = router();

        let (status, body) = send(&app, Method::GET, "/api/v1/classes/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _) = send(&app, Method::PATCH, "/api/v1/classes/nope", Some(json!({"year": 1}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/api/v1/classes/nope/exams", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_list_parameters_fall_back_to_defaults() {
        let app = router();
        for year in [2024, 2025] {
            let (status, _) = send(&app, Method::POST, "/api/v1/classes", Some(json!({"year": year}))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/classes?year=&semester=%20&course_id=&page=&size=",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let (status, body) = send(&app, Method::GET, "/api/v1/classes?page=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn exam_id_unusable_in_location_is_rejected_before_saving() {
        let app = router();
        let (_, created) = send(&app, Method::POST, "/api/v1/classes", Some(json!({"year": 2025}))).await;
        let exams = format!("/api/v1/classes/{}/exams", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::POST, &exams, Some(json!({"id": "x\u{1}y", "name": "P1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let (status, listed) = send(&app, Method::GET, &exams, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn health_reports_store_state() {
        let (status, body) = send(&router(), Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
        assert_eq!(body["components"]["memory"]["status"], "UP");

        let (status, body) = send(&router_with(Arc::new(Unreachable)), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "DOWN");
        assert_eq!(body["components"]["mongo"]["database"], "classes");
        assert!(body["components"]["mongo"]["error"].is_string());
    }

    #[tokio::test]
    async fn unreachable_store_is_service_unavailable() {
        let app = router_with(Arc::new(Unreachable));
        let (status, body) = send(&app, Method::GET, "/api/v1/classes", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn banner_is_public() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
