//! Core business logic for the school registry.
//!
//! Services validate input and references, then delegate persistence to
//! the repositories in `school-db`.

pub mod services;

pub use services::*;
