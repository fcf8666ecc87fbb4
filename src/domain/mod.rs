//! Domain layer - Core business logic and entities

pub mod application;
pub mod context;
pub mod error;
pub mod event;
pub mod key;

pub use application::{Application, ApplicationId, ApplicationRepository, LoadOptions};
pub use context::{Actor, RequestContext};
pub use error::DomainError;
pub use event::{KeyEvent, KeyEventKind, KeyEventPublisher};
pub use key::{Key, KeyGenerator, KeyMaterial, KeyStore, KeyTransaction, KeyType};

#[cfg(test)]
pub use application::MockApplicationRepository;
#[cfg(test)]
pub use event::MockKeyEventPublisher;
