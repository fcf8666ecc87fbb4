//! Infrastructure layer - Generators, storage backends and event publishers

pub mod event;
pub mod key;
pub mod logging;
pub mod storage;
