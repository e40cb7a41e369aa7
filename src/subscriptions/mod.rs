mod dto;
pub mod handlers;
pub mod model;
mod repo;
pub mod services;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions",
            post(handlers::create_subscription).get(handlers::list_subscriptions),
        )
        .route("/subscriptions/total", get(handlers::total))
        .route(
            "/subscriptions/:id",
            get(handlers::get_subscription)
                .put(handlers::update_subscription)
                .delete(handlers::delete_subscription),
        )
}
