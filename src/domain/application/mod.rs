//! Application domain

mod entity;
mod repository;

pub use entity::{Application, ApplicationId, LoadOptions};
pub use repository::ApplicationRepository;

#[cfg(test)]
pub use repository::MockApplicationRepository;
