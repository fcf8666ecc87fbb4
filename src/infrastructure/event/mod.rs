//! Key event publishers

mod broadcast;
mod logging;

pub use broadcast::BroadcastEventPublisher;
pub use logging::LoggingEventPublisher;
