//! Hiroba server: real-time presence, room membership and message fanout.

pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
