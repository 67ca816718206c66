#![deny(missing_docs)]

//! Core library for the student registry service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// In-memory student record storage.
pub mod store;
/// Client for the external summary generation service.
pub mod summarization;
