//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{admin, assignments, health_handler, offers, payments, requests, tracking};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let jwt_service = deps.jwt_service.clone();
    let app_state = AppState {
        deps: Arc::new(deps),
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        // Owner: requests and the offers on them
        .route(
            "/requests",
            post(requests::create_request_handler).get(requests::list_requests_handler),
        )
        .route(
            "/requests/:id",
            get(requests::get_request_handler)
                .patch(requests::update_request_handler)
                .delete(requests::delete_request_handler),
        )
        .route("/requests/:id/cancel", post(requests::cancel_request_handler))
        .route(
            "/requests/:id/offers",
            get(offers::list_request_offers_handler).post(offers::submit_offer_handler),
        )
        .route(
            "/requests/:id/assignment",
            get(assignments::request_assignment_handler),
        )
        .route("/offers/:id/accept", post(offers::accept_offer_handler))
        .route("/offers/:id/reject", post(offers::reject_offer_handler))
        // Assignment lifecycle
        .route("/assignments/:id", get(assignments::get_assignment_handler))
        .route("/assignments/:id/start", post(assignments::start_handler))
        .route("/assignments/:id/cancel", post(assignments::cancel_handler))
        .route("/assignments/:id/complete", post(assignments::complete_handler))
        .route("/assignments/:id/mark-paid", post(assignments::mark_paid_handler))
        .route("/assignments/:id/locations", post(tracking::record_location_handler))
        .route("/assignments/:id/route", get(tracking::route_handler))
        // Walker views
        .route("/walker/requests", get(requests::visible_requests_handler))
        .route("/walker/offers", get(offers::walker_offers_handler))
        .route("/walker/payments", get(payments::walker_payments_handler))
        // Operator
        .route("/admin/fees/settle", post(admin::settle_fees_handler))
        // Health check
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Any origin when none are configured (development).
fn allow_origin(allowed_origins: &[String]) -> AllowOrigin {
    if allowed_origins.is_empty() {
        return AllowOrigin::any();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    AllowOrigin::list(origins)
}
