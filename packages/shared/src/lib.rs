//! Utilities shared between the Hiroba server binary and its library layers.

pub mod logger;
pub mod time;
