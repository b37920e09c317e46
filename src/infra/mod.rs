//! Infrastructure adapters and runtime bootstrap.

pub mod bootstrap;
pub mod error;
pub mod fetch;
pub mod http;
pub mod retry;
pub mod telemetry;
