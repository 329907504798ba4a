//! API endpoints.

mod classes;
mod departments;
mod health;
mod sections;
mod setup;
mod students;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/classes", classes::router())
        .nest("/departments", departments::router())
        .nest("/sections", sections::router())
        .nest("/students", students::router())
        .nest("/setup", setup::router())
}
