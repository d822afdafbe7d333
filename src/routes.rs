use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use crate::handlers::{broadcasts, home, posts, sessions, users};
use crate::middleware::{
    admin_required, load_context, login_required, store_location, strip_format_extension,
};
use crate::state::AppState;

/// Builds the application router.
///
/// The caller adds the `SessionManagerLayer`; every route here needs a
/// session.
pub fn router(state: AppState) -> Router {
    let bounce_back = Router::new()
        .route("/", get(home::index))
        .route("/posts", get(posts::index))
        .route("/posts/new", get(posts::new))
        .route("/posts/search", get(posts::search))
        .route("/posts/{id}", get(posts::show))
        .route_layer(from_fn_with_state(state.clone(), store_location));

    let admin_pages = Router::new()
        .route("/users", get(users::index))
        .route("/users/{id}", get(users::show))
        .route("/broadcasts", get(broadcasts::index))
        .route_layer(from_fn_with_state(state.clone(), store_location));

    let admin = Router::new()
        .route("/broadcasts", post(broadcasts::create))
        .merge(admin_pages)
        .route_layer(from_fn_with_state(state.clone(), admin_required));

    let protected = Router::new()
        .route("/posts", post(posts::create))
        .route("/posts/{id}/replies", post(posts::reply))
        .merge(bounce_back)
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), login_required));

    let public = Router::new()
        .route("/session/new", get(sessions::new))
        .route("/session", post(sessions::create))
        .route("/session/logout", post(sessions::destroy));

    let app = protected
        .merge(public)
        .layer(from_fn_with_state(state.clone(), load_context))
        .with_state(state);

    // Extensions have to go before the inner router matches
    Router::new()
        .fallback_service(app)
        .layer(from_fn(strip_format_extension))
}
