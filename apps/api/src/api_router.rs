mod cors;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post};
use certus_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

use cors::build_cors_layer;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/api/users/capability",
            get(handlers::users::management_capability_handler),
        )
        .route(
            "/api/users/creatable-roles",
            get(handlers::users::creatable_roles_handler),
        )
        .route(
            "/api/users/assignable-locations",
            get(handlers::users::assignable_locations_handler),
        )
        .route(
            "/api/users/{user_id}",
            patch(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/callback", get(auth::callback_handler))
        .route("/auth/logout", post(auth::logout_handler));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
