use crate::controller::{health_check_controller, oauth_controller};
use crate::AppState;
use axum::{routing::get, Router};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "OAuth State API"
        ),
        paths(
            health_check_controller::health_check,
            oauth_controller::authorize,
            oauth_controller::callback,
        ),
        tags(
            (name = "oauth_state", description = "OAuth state synchronization between user agent and authorization server")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// Neither route is protected: both are reached through browser redirects
// and the callback authenticates itself through the state cookie.
fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/oauth/authorize", get(oauth_controller::authorize))
        .route("/oauth/callback", get(oauth_controller::callback))
        .with_state(app_state)
}
