//! TypingTracker の実装

pub mod inmemory;

pub use inmemory::{DEFAULT_TYPING_TIMEOUT, InMemoryTypingTracker};
