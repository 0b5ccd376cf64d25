//! OData module
//!
//! Query building, filter helpers and the HTTP client for the Topz OData API

pub mod client;
pub mod filters;
pub mod model;
pub mod query;


pub use client::{ODataClient, ODataError, DEFAULT_TIMEOUT};
pub use model::{Entity, EntitySet, QueryResult};
pub use query::QueryOptions;
