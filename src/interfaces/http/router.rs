//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{AvailabilityChecker, PaymentReconciler, ReservationLedger, RoomCatalog};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{bookings, health, payments, rooms};

/// Application services the HTTP layer dispatches to
#[derive(Clone)]
pub struct ApiServices {
    pub ledger: Arc<ReservationLedger>,
    pub reconciler: Arc<PaymentReconciler>,
    pub catalog: Arc<RoomCatalog>,
    pub availability: Arc<AvailabilityChecker>,
}

#[derive(Clone)]
pub struct RouterSettings {
    pub jwt_config: JwtConfig,
    pub webhook_secret: String,
    /// Renders `/metrics` when present
    pub metrics: Option<PrometheusHandle>,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by the identity service"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        rooms::list_rooms,
        rooms::list_room_types,
        rooms::search_rooms,
        rooms::list_available_rooms,
        rooms::get_room,
        rooms::create_room,
        rooms::update_room,
        rooms::delete_room,
        bookings::create_booking,
        bookings::list_bookings,
        bookings::my_bookings,
        bookings::get_booking,
        bookings::update_booking,
        payments::create_intent,
        payments::payment_webhook,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Rooms", description = "Room catalogue and availability"),
        (name = "Bookings", description = "Reservations"),
        (name = "Payments", description = "Payment intents and provider outcomes"),
    ),
    info(
        title = "Hotel Booking API",
        description = "Room reservations with asynchronous payment reconciliation"
    )
)]
pub struct ApiDoc;

pub fn create_api_router(
    services: ApiServices,
    db: DatabaseConnection,
    settings: RouterSettings,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_state = AuthState {
        jwt_config: settings.jwt_config,
    };
    let require_auth = middleware::from_fn_with_state(auth_state, auth_middleware);

    // Reads are public; catalogue changes need a token (and the admin role,
    // checked by the service).
    let room_routes = Router::new()
        .route(
            "/",
            get(rooms::list_rooms)
                .merge(post(rooms::create_room).route_layer(require_auth.clone())),
        )
        .route("/types", get(rooms::list_room_types))
        .route("/search", get(rooms::search_rooms))
        .route("/available", get(rooms::list_available_rooms))
        .route(
            "/{id}",
            get(rooms::get_room).merge(
                put(rooms::update_room)
                    .delete(rooms::delete_room)
                    .route_layer(require_auth.clone()),
            ),
        )
        .with_state(rooms::RoomAppState {
            catalog: services.catalog,
            availability: services.availability,
        });

    let booking_routes = Router::new()
        .route(
            "/",
            get(bookings::list_bookings)
                .post(bookings::create_booking)
                .put(bookings::update_booking),
        )
        .route("/mine", get(bookings::my_bookings))
        .route("/{reference}", get(bookings::get_booking))
        .route_layer(require_auth.clone())
        .with_state(bookings::BookingAppState {
            ledger: services.ledger,
        });

    let payment_routes = Router::new()
        .route(
            "/intent",
            post(payments::create_intent).route_layer(require_auth),
        )
        .route("/webhook", post(payments::payment_webhook))
        .with_state(payments::PaymentAppState {
            reconciler: services.reconciler,
            webhook_secret: Arc::from(settings.webhook_secret),
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .nest("/api/v1/rooms", room_routes)
        .nest("/api/v1/bookings", booking_routes)
        .nest("/api/v1/payments", payment_routes);

    if let Some(handle) = settings.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::ports::{
        GatewayError, PaymentGateway, PaymentIntent, PaymentIntentRequest,
    };
    use crate::application::services::test_support::clock;
    use crate::application::{LedgerSettings, ReconcilerSettings};
    use crate::domain::identity::Role;
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::crypto::signature::sign_payload;
    use crate::infrastructure::database::repositories::test_support::memory_db;
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::notifications::testing::RecordingGateway;
    use crate::notifications::Notifier;

    const WEBHOOK_SECRET: &str = "whsec_test";

    struct StubGateway;

    #[async_trait]
    impl PaymentGateway for StubGateway {
        fn name(&self) -> &'static str {
            "STRIPE"
        }

        async fn create_intent(
            &self,
            request: &PaymentIntentRequest,
        ) -> Result<PaymentIntent, GatewayError> {
            Ok(PaymentIntent {
                id: format!("pi_{}", request.booking_reference),
                client_secret: format!("pi_{}_secret", request.booking_reference),
            })
        }
    }

    async fn app() -> Router {
        let db = memory_db().await;
        let repos: Arc<dyn crate::domain::repositories::RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let notifier = || {
            Notifier::new(
                Arc::new(RecordingGateway::default()),
                Duration::from_secs(1),
            )
        };

        let services = ApiServices {
            ledger: Arc::new(ReservationLedger::new(
                repos.clone(),
                clock(),
                notifier(),
                LedgerSettings::default(),
            )),
            reconciler: Arc::new(PaymentReconciler::new(
                repos.clone(),
                Arc::new(StubGateway),
                notifier(),
                ReconcilerSettings::default(),
            )),
            catalog: Arc::new(RoomCatalog::new(repos.clone())),
            availability: Arc::new(AvailabilityChecker::new(repos, clock())),
        };

        create_api_router(
            services,
            db,
            RouterSettings {
                jwt_config: JwtConfig::default(),
                webhook_secret: WEBHOOK_SECRET.to_string(),
                metrics: None,
            },
        )
    }

    fn token(user_id: &str, role: Role) -> String {
        create_token(
            user_id,
            &format!("{user_id}@example.com"),
            role,
            &JwtConfig::default(),
        )
        .unwrap()
    }

    async fn read(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        read(app.clone().oneshot(request).await.unwrap()).await
    }

    async fn webhook(app: &Router, payload: &Value, signature: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/payments/webhook")
            .header("content-type", "application/json")
            .header("x-webhook-signature", signature)
            .body(Body::from(serde_json::to_vec(payload).unwrap()))
            .unwrap();
        read(app.clone().oneshot(request).await.unwrap()).await
    }

    fn signed(payload: &Value) -> String {
        sign_payload(WEBHOOK_SECRET, &serde_json::to_vec(payload).unwrap())
    }

    async fn add_room(app: &Router, number: i32) -> i64 {
        let admin = token("admin", Role::Admin);
        let (status, body) = call(
            app,
            "POST",
            "/api/v1/rooms",
            Some(&admin),
            Some(json!({
                "roomNumber": number,
                "roomType": "DOUBLE",
                "pricePerNight": "120.00",
                "capacity": 2,
                "description": "Double room with city view"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    async fn book(app: &Router, user: &str, room_id: i64, from: &str, to: &str) -> (StatusCode, Value) {
        call(
            app,
            "POST",
            "/api/v1/bookings",
            Some(&token(user, Role::Customer)),
            Some(json!({"roomId": room_id, "checkInDate": from, "checkOutDate": to})),
        )
        .await
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = app().await;
        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"]["status"], "ok");
    }

    #[tokio::test]
    async fn bookings_require_a_token() {
        let app = app().await;
        let (status, body) = call(&app, "GET", "/api/v1/bookings/mine", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn customers_cannot_change_the_catalogue() {
        let app = app().await;
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/rooms",
            Some(&token("guest", Role::Customer)),
            Some(json!({"roomNumber": 1, "roomType": "SINGLE", "pricePerNight": "50", "capacity": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        let (status, _) = call(&app, "DELETE", "/api/v1/rooms/1", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn booking_flow_over_http() {
        let app = app().await;
        let room_id = add_room(&app, 101).await;

        let (status, body) = book(&app, "alice", room_id, "2030-01-10", "2030-01-12").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let data = &body["data"];
        let reference = data["bookingReference"].as_str().unwrap().to_string();
        assert_eq!(reference.len(), 10);
        assert_eq!(data["totalPrice"], "240.00");
        assert_eq!(data["bookingStatus"], "BOOKED");
        assert_eq!(data["paymentStatus"], "PENDING");
        assert_eq!(data["guest"]["userId"], "alice");
        assert_eq!(data["room"]["roomNumber"], 101);

        // Shares the night of the 11th.
        let (status, body) = book(&app, "bob", room_id, "2030-01-11", "2030-01-13").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ROOM_UNAVAILABLE");

        // Back-to-back stays do not overlap.
        let (status, _) = book(&app, "bob", room_id, "2030-01-12", "2030-01-13").await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/api/v1/bookings/{reference}");
        let (status, _) = call(&app, "GET", &uri, Some(&token("alice", Role::Customer)), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&app, "GET", &uri, Some(&token("bob", Role::Customer)), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, body) = call(
            &app,
            "GET",
            "/api/v1/bookings/mine",
            Some(&token("alice", Role::Customer)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let mine = body["data"].as_array().unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine[0].get("room").is_none());
        assert!(mine[0].get("guest").is_none());
    }

    #[tokio::test]
    async fn invalid_dates_are_400() {
        let app = app().await;
        let room_id = add_room(&app, 102).await;

        let (status, body) = book(&app, "alice", room_id, "2030-01-12", "2030-01-12").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_DATE_RANGE");

        // Clock says today is 2030-01-02.
        let (status, body) = book(&app, "alice", room_id, "2030-01-01", "2030-01-04").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("current date"));
    }

    #[tokio::test]
    async fn available_rooms_exclude_booked_ones() {
        let app = app().await;
        let booked = add_room(&app, 201).await;
        let free = add_room(&app, 202).await;
        let (status, _) = book(&app, "alice", booked, "2030-02-01", "2030-02-05").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            "GET",
            "/api/v1/rooms/available?checkInDate=2030-02-03&checkOutDate=2030-02-04&roomType=double",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let ids: Vec<i64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![free]);
    }

    #[tokio::test]
    async fn webhook_settles_booking_once() {
        let app = app().await;
        let room_id = add_room(&app, 301).await;
        let (_, body) = book(&app, "alice", room_id, "2030-03-01", "2030-03-03").await;
        let reference = body["data"]["bookingReference"].as_str().unwrap().to_string();
        let alice = token("alice", Role::Customer);

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/payments/intent",
            Some(&alice),
            Some(json!({"bookingReference": reference, "amount": "240.00"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["clientSecret"], format!("pi_{reference}_secret"));

        let payload = json!({
            "bookingReference": reference,
            "transactionId": "txn_1",
            "amount": "240.00",
            "success": true
        });

        let (status, _) = webhook(&app, &payload, "deadbeef").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = webhook(&app, &payload, &signed(&payload)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["applied"], true);

        let (status, body) = webhook(&app, &payload, &signed(&payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["applied"], false);

        let uri = format!("/api/v1/bookings/{reference}");
        let (_, body) = call(&app, "GET", &uri, Some(&alice), None).await;
        assert_eq!(body["data"]["paymentStatus"], "COMPLETED");

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/payments/intent",
            Some(&alice),
            Some(json!({"bookingReference": reference, "amount": "240.00"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_PAID");
    }

    #[tokio::test]
    async fn webhook_for_unknown_booking_is_404() {
        let app = app().await;
        let payload = json!({
            "bookingReference": "NOPE234567",
            "transactionId": "txn_x",
            "amount": "10.00",
            "success": false,
            "failureReason": "card_declined"
        });
        let (status, body) = webhook(&app, &payload, &signed(&payload)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn admin_cancellation_frees_the_room() {
        let app = app().await;
        let room_id = add_room(&app, 401).await;
        let (_, body) = book(&app, "alice", room_id, "2030-04-01", "2030-04-03").await;
        let booking_id = body["data"]["id"].as_i64().unwrap();
        let admin = token("admin", Role::Admin);

        let (status, body) = call(
            &app,
            "PUT",
            "/api/v1/bookings",
            Some(&admin),
            Some(json!({"id": booking_id, "bookingStatus": "CANCELLED"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["bookingStatus"], "CANCELLED");

        let (status, _) = book(&app, "bob", room_id, "2030-04-01", "2030-04-03").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            "GET",
            "/api/v1/bookings?newestFirst=false",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let all = body["data"].as_array().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0]["bookingStatus"], "CANCELLED");
        assert_eq!(all[1]["bookingStatus"], "BOOKED");
        for summary in all {
            assert!(summary.get("room").is_none(), "{summary}");
            assert!(summary.get("guest").is_none(), "{summary}");
        }
    }
}
