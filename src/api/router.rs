//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/profile", post(endpoints::profiles::upsert))
        .route("/profiles/:user_id", get(endpoints::profiles::detail))
        .route("/medicines", post(endpoints::medicines::create))
        // GET takes a profile id, PATCH/DELETE a medicine id; matchit 0.7
        // requires a single parameter name per path slot.
        .route(
            "/medicines/:id",
            get(endpoints::medicines::list)
                .patch(endpoints::medicines::update)
                .delete(endpoints::medicines::remove),
        )
        .route(
            "/prescriptions/upload",
            post(endpoints::prescriptions::upload)
                .layer(DefaultBodyLimit::max(endpoints::prescriptions::MAX_UPLOAD_BYTES)),
        )
        .route("/adherence_log", post(endpoints::adherence::record))
        .route("/adherence_log/:user_id", get(endpoints::adherence::history))
        .route("/risk/:user_id", get(endpoints::risk::assess))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
}
