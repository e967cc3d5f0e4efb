//! Backend Starter
//!
//! A production-ready Axum backend starter with PostgreSQL, media uploads,
//! and uniform JSON response envelopes.
//!
//! # Architecture Overview
//!
//! This crate is organized into four main layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │  HTTP handlers, routing, middleware stack    │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │    Use-case orchestration, shared state      │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │   Traits, envelopes, errors (no I/O deps)    │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │  Database pool, media host client, config    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Key Features
//!
//! - **Trait-based abstraction**: The database and media host are behind traits
//! - **Dependency injection**: Components receive their dependencies through constructors
//! - **Uniform envelopes**: Every response body is `{statusCode, message, data, success}`
//! - **Centralized errors**: One `IntoResponse` impl shapes every failure, with
//!   development-mode diagnostics and production-mode redaction
//! - **Scoped cleanup**: Upload spool files are removed whether the remote call
//!   succeeds or fails
//! - **Logging**: Structured logging with `tracing`
//! - **Security**: Secret management with `secrecy`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use backend_starter::api::create_router;
//! use backend_starter::app::AppState;
//! use backend_starter::infra::{AppConfig, CloudinaryClient, PostgresClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!
//!     // Create infrastructure clients
//!     let db = Arc::new(PostgresClient::with_defaults(&config.database_url).await?);
//!     let media = Arc::new(CloudinaryClient::with_defaults(&config.media)?);
//!
//!     // Create application state
//!     let state = Arc::new(AppState::new(db, media));
//!
//!     // Create and serve the router
//!     let router = create_router(state);
//!     axum::serve(listener, router).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

// Mock implementations, shared by unit and integration tests
pub mod test_utils;
