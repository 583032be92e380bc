//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, path from CONFIG_PATH)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Config (validated, immutable)
//!     → shared via Arc to the engine and clients
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no reload, no process-global state
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::CardinalityConfig;
pub use schema::Config;
