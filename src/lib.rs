//! Server-rendered marketing site for an orthopedic supply catalog.
//!
//! - `catalog/`: products.json parsing, lookup indices, per-page view models
//! - `featured`: deterministic weekly featured-product rotation
//! - `studies`: clinical study pages
//! - `forms/`: contact and order-request validation and email bodies
//! - `mail/`: outbound email with runtime transport selection
//! - `server`: Axum application state, router and handlers

pub mod catalog;
pub mod config;
pub mod featured;
pub mod forms;
pub mod mail;
pub mod server;
pub mod studies;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::Config;
pub use mail::{Mailer, OutboundEmail};
pub use server::{create_router, AppState};
