//! User domain module.

mod model;
mod repository;

pub use model::UserProfile;
pub use repository::UserRepository;
