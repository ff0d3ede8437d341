//! Application layer for Vegiscale.
//!
//! This crate provides the use-case services that coordinate between the
//! domain and infrastructure layers: the weighing session engine, the
//! identification gate, device status tracking, user profile management,
//! and the request pipeline API bindings run ahead of every call.

pub mod device_status;
pub mod identification;
pub mod pipeline;
pub mod user_profile;
pub mod weighing;

pub use device_status::DeviceService;
pub use identification::{IdentificationOutcome, IdentificationService, RejectReason};
pub use pipeline::{Pipeline, RequestContext, Stage};
pub use user_profile::UserProfileService;
pub use weighing::{InitiateSessionRequest, SessionDetail, WeighingService, WeightOutcome};
