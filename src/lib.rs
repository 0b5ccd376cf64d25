//! Topz OData MCP Library
//!
//! Model Context Protocol server exposing the Topz OData API (orders,
//! payment terms and the API schema) as tools.

pub mod config;
pub mod mcp;
pub mod odata;

pub use config::{Config, ConfigError};
pub use odata::{ODataClient, ODataError, QueryOptions};
