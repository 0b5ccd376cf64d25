//! MCP Server implementation for the Topz OData API
//!
//! Exposes the schema, order and payment term tools over JSON-RPC

pub mod protocol;
mod server;
pub mod tools;
pub mod transport;

pub use protocol::*;
pub use server::TopzMcpServer;
pub use transport::serve;
