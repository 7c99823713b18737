//! Current user record: profile, subscription and enrollments.
mod builder;
mod gateway;
mod repository;
mod service;

pub use builder::*;
pub use gateway::*;
pub use repository::*;
pub use service::*;
