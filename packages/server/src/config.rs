//! Server configuration.

use std::time::Duration;

use crate::infrastructure::{DEFAULT_EVENT_CAPACITY, DEFAULT_TYPING_TIMEOUT};

/// Runtime configuration, built from command-line arguments in the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Typing indicators expire after this long; the sweeper runs on the same interval.
    pub typing_timeout: Duration,
    /// Capacity of the domain event channel.
    pub event_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            typing_timeout: DEFAULT_TYPING_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
