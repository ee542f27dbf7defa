//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server for jobkeeper's `jobs.*.v1` method
//! family.

pub mod error;
pub mod handler;
mod rate_limiter;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
