//! Capture short idea fragments, then let a language model tag, cluster, and
//! summarize them.
//!
//! IdeaCloud keeps everything in a local SQLite file and delegates all
//! "intelligence" to an OpenAI-compatible chat-completion endpoint:
//!
//! | Operation | Model pass | Writes |
//! |-----------|------------|--------|
//! | **capture** | up to two tags per fragment | one fragment |
//! | **map** | 3–8 clusters over the latest 200 fragments | cluster table, fragment cluster refs |
//! | **insight** | summary, next steps, titles | singleton insight cache |
//! | **import / export** | none | fragment table |
//!
//! The insight cache remembers which fragment ids it already covers, so later
//! runs only send new fragments and merge the answer into the previous summary.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database initialization, schema, and migrations
//! - [`ideas`]: Record types and table access: fragments, clusters, insight cache, transfer
//! - [`model`]: Retrying JSON client for the external model and typed replies
//! - [`flows`]: The user-facing operations, behind one [`flows::IdeaCloud`] handle

pub mod config;
pub mod db;
pub mod error;
pub mod flows;
pub mod ideas;
pub mod model;

pub use error::{IdeaError, Result};
