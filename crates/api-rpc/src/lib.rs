//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 control surface of the NetGuard daemon:
//! start/stop monitoring, status, log tail and adapter listing.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
