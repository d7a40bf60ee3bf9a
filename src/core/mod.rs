//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod logging;
pub mod session;
pub mod validation;

pub use config::Config;
pub use entity::Entity;
pub use session::{Session, SessionError};
pub use validation::{BuildResult, ValidationError};
