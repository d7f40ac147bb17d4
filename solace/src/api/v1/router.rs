use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let notes = Router::new()
        .route(
            "/",
            get(handlers::notes::list_notes).post(handlers::notes::create_note),
        )
        .route(
            "/{noteId}",
            get(handlers::notes::get_note)
                .patch(handlers::notes::update_note)
                .delete(handlers::notes::delete_note),
        );

    let advice = Router::new()
        .route("/", get(handlers::advice::list_advice))
        .route("/latest", get(handlers::advice::get_latest_advice))
        .route("/eligibility", get(handlers::advice::check_eligibility))
        .route("/jobs/{jobId}", get(handlers::advice::get_advice_job));

    let memories = Router::new().route("/", get(handlers::memories::list_memories));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/quotes/random", get(handlers::quotes::get_random_quote))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .nest("/notes", notes)
        .nest("/advice", advice)
        .route("/advice:generate", post(handlers::advice::generate_advice))
        .nest("/memories", memories)
        .route("/users/me", delete(handlers::users::delete_me))
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
