//! Library surface of the server binary: configuration, logging, and
//! the HTTP/WebSocket API. Split out so integration tests can build
//! the router in-process.

pub mod api;
pub mod config;
pub mod logging;
