//! Session domain module.
//!
//! This module contains all session-related domain models, the store
//! interface, and partition routing.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `WeightReading`,
//!   `Identification`)
//! - `kind`: Partition tag and prefix routing (`SessionKind`)
//! - `status`: Lifecycle state (`SessionStatus`)
//! - `store`: Store trait with the conditional mutation primitives
//!   (`SessionStore`)

mod kind;
mod model;
mod status;
mod store;

// Re-export public API
pub use kind::SessionKind;
pub use model::{Identification, Session, WeightReading};
pub use status::SessionStatus;
pub use store::SessionStore;
