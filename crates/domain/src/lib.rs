//! social-scheduler domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `tags`: Status/platform tag codec
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Post repository, publish orchestrator, and action surface

pub mod model;
pub mod ports;
pub mod tags;
pub mod usecases;

pub use model::*;
pub use ports::*;
pub use tags::{SOCIAL_TAG, TagError};
