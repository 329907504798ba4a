//! HTTP API layer for the school registry.
//!
//! - **Endpoints**: classes, departments, sections, students and the setup wizard
//! - **Extractors**: JSON bodies and list queries that fail with the common error envelope
//! - **Middleware**: shared application state
//! - **Response**: success envelopes
//!
//! Built on Axum 0.8. Mount [`router`] under `/api`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
