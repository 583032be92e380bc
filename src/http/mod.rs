//! HTTP transport shell.
//!
//! # Data Flow
//! ```text
//! GET /datasets/{dataset_id}/editions/{edition}/versions/{version}/observations
//!     → server.rs (Axum setup, caller identity extraction)
//!     → QueryEngine (the pipeline)
//!     → JSON document, or (status, message) via the error taxonomy
//! ```

pub mod server;

pub use server::HttpServer;
