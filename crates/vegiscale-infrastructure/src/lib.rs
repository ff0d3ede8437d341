//! Infrastructure layer for Vegiscale.
//!
//! Concrete adapters behind the domain trait seams: the in-memory session
//! store with conditional mutation primitives, image stores, the HTTP
//! classifier gateway client, the device registry, the user repository, and
//! TOML configuration loading.

pub mod config_service;
pub mod http_classifier;
pub mod image_store;
pub mod memory_device_registry;
pub mod memory_session_store;
pub mod memory_user_repository;

pub use crate::config_service::load_config;
pub use crate::http_classifier::HttpClassifierGateway;
pub use crate::image_store::{LocalDirImageStore, MemoryImageStore};
pub use crate::memory_device_registry::MemoryDeviceRegistry;
pub use crate::memory_session_store::MemorySessionStore;
pub use crate::memory_user_repository::MemoryUserRepository;
