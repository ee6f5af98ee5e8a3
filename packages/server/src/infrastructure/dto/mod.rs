//! Data Transfer Objects (DTOs) for the presence server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket envelope, inbound payloads and outbound payloads
//! - `http`: HTTP API response DTOs
//! - `conversion`: domain → DTO conversions and outbound frame encoding

pub mod conversion;
pub mod http;
pub mod websocket;
