//! Domain layer for the Vegiscale weighing backend.
//!
//! This crate holds the domain models (sessions, readings, devices, users),
//! the error taxonomy, configuration types, and the trait seams every
//! external collaborator is consumed through: the session store, the
//! classifier gateway, the image store, the device registry, and the user
//! repository. Application services in `vegiscale-application` operate on
//! these types; concrete adapters live in `vegiscale-infrastructure`.

pub mod classifier;
pub mod config;
pub mod device;
pub mod error;
pub mod identity;
pub mod image_store;
pub mod session;
pub mod user;

// Re-export common error type
pub use error::{Result, WeighError};
