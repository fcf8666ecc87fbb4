//! Key lifecycle events

mod entity;
mod publisher;

pub use entity::{KeyEvent, KeyEventKind};
pub use publisher::KeyEventPublisher;

#[cfg(test)]
pub use publisher::MockKeyEventPublisher;
