use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::db::Store;
use crate::domain::Capability;
use crate::services::{AuthService, Notifier, ReservationService};
use crate::state::SharedState;

pub mod auth;
mod equipment;
mod error;
mod home;
mod reservations;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth
    }

    #[must_use]
    pub fn reservations(&self) -> &Arc<dyn ReservationService> {
        &self.shared.reservations
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.shared.notifier
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState { shared })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

/// Server-side capability gate; every privileged handler calls this before
/// touching anything.
pub fn require_capability(
    user: &crate::db::User,
    capability: Capability,
) -> Result<(), ApiError> {
    if user.role.allows(capability) {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let server_config = &state.config().server;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(server_config.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server_config.session_ttl_minutes,
        )));

    let cors_origins = server_config.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password/{token}", get(auth::check_reset_token))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/meta", get(home::meta))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback(not_found)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/home", get(home::home))
        .route("/equipment", get(equipment::list_equipment))
        .route("/equipment", post(equipment::create_equipment))
        .route("/equipment/categories", get(equipment::list_categories))
        .route("/equipment/{id}", get(equipment::get_equipment))
        .route("/equipment/{id}", put(equipment::update_equipment))
        .route("/equipment/{id}", delete(equipment::delete_equipment))
        .route("/reservations", get(reservations::list_reservations))
        .route("/reservations", post(reservations::create_reservation))
        .route(
            "/reservations/{id}/cancel",
            post(reservations::cancel_reservation),
        )
        .route("/users", get(users::list_users))
        .route("/users/staff", post(users::create_staff))
        .route_layer(middleware::from_fn_with_state(state, auth::require_user))
}

/// Unknown routes get the same envelope as everything else
async fn not_found() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Not found")),
    )
}
