//! MCP tool definitions and their execute functions

use crate::mcp::protocol::{create_tool_schema, ParamType, Tool};
use crate::odata::{Entity, ODataClient, ODataError, QueryOptions, QueryResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const GET_SCHEMA: &str = "get_schema";
pub const QUERY_ORDERS: &str = "query_orders";
pub const QUERY_PAYMENT_TERMS: &str = "query_payment_terms";

/// Errors produced while running a tool
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: &'static str, message: String },

    #[error("{context}: {source}")]
    Request {
        context: &'static str,
        #[source]
        source: ODataError,
    },

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Arguments accepted by the collection query tools
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QueryInput {
    pub select: Option<String>,
    pub filter: Option<String>,
    #[serde(default, deserialize_with = "whole_number")]
    pub top: Option<u64>,
    #[serde(default, deserialize_with = "whole_number")]
    pub skip: Option<u64>,
    pub orderby: Option<String>,
}

/// Accept a non-negative integer, also when sent as a float with no
/// fractional part (`10.0`)
fn whole_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = match Option::<serde_json::Number>::deserialize(deserializer)? {
        Some(value) => value,
        None => return Ok(None),
    };

    if let Some(n) = value.as_u64() {
        return Ok(Some(n));
    }

    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(Some(f as u64)),
        _ => Err(D::Error::custom(format!(
            "expected a non-negative integer, got {}",
            value
        ))),
    }
}

impl From<QueryInput> for QueryOptions {
    fn from(input: QueryInput) -> Self {
        QueryOptions {
            select: input.select,
            filter: input.filter,
            top: input.top,
            skip: input.skip,
            orderby: input.orderby,
            count: false,
        }
    }
}

/// Text payload returned by the query tools
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuerySummary<'a> {
    summary: String,
    count: usize,
    total_size: u64,
    done: bool,
    data: &'a [Entity],
}

const QUERY_ORDERS_DESCRIPTION: &str = "Query orders in the Topz API using OData syntax.

EXAMPLES:
1. All orders with selected fields:
   select=\"id,name,customer,order_status,total\"
2. Orders above $300,000:
   filter=\"total gt 300000\"
3. Orders above $10K that are in progress:
   filter=\"total gt 10000 and order_status eq 'Active Project - In-Progress'\"
   order_status values are case-sensitive and must match the API exactly.
4. Text search across several fields:
   filter=\"search eq 'Gordon Square'\"
   'search' is a Topz pseudo-field, not a real attribute of the order.
5. Grouping with parentheses:
   filter=\"(total gt 20000 and cost gt 20000) or sales_tax gt 3000\"
6. Orders created by someone:
   filter=\"creator eq 'Support, Sean'\"
   creator uses the format \"Last, First\".
7. All orders: pass no parameters, or only select to limit the fields.

FIELDS: id, name, customer, order_status, total, cost, sales_tax, creator

FILTER OPERATORS: eq, ne, gt, ge, lt, le, and, or, parentheses for grouping.
Strings go in single quotes ('Active'); numbers and booleans are bare (active eq true).

PAGING AND SORTING:
- top: maximum number of results (e.g. 10)
- skip: results to skip (skip=20 with top=10 is page 3)
- orderby: sort order (e.g. \"total desc\" or \"name asc\")";

const QUERY_PAYMENT_TERMS_DESCRIPTION: &str = "Query payment terms in the Topz API using OData syntax.

Examples:
- All payment terms: pass no parameters
- Active terms: filter=\"active eq true\"
- Selected fields: select=\"id,name,active\"
- Sorted by name: orderby=\"name asc\"

Filter operators: eq, ne, and, or";

/// Get all available tools
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: GET_SCHEMA.to_string(),
            description: "Get the complete OData schema of the Topz API. Useful to discover which entities and fields can be queried.".to_string(),
            input_schema: create_tool_schema(vec![]),
        },
        Tool {
            name: QUERY_ORDERS.to_string(),
            description: QUERY_ORDERS_DESCRIPTION.to_string(),
            input_schema: create_tool_schema(vec![
                ("select", ParamType::String, "Comma-separated fields to return, e.g. 'id,name,customer,total'", false),
                ("filter", ParamType::String, "OData filter, e.g. 'total gt 300000' or \"order_status eq 'Active'\"", false),
                ("top", ParamType::Integer, "Maximum number of results to return", false),
                ("skip", ParamType::Integer, "Number of results to skip (for pagination)", false),
                ("orderby", ParamType::String, "Sort order, e.g. 'total desc' or 'name asc'", false),
            ]),
        },
        Tool {
            name: QUERY_PAYMENT_TERMS.to_string(),
            description: QUERY_PAYMENT_TERMS_DESCRIPTION.to_string(),
            input_schema: create_tool_schema(vec![
                ("select", ParamType::String, "Comma-separated fields to return, e.g. 'id,name,active'", false),
                ("filter", ParamType::String, "OData filter, e.g. 'active eq true'", false),
                ("top", ParamType::Integer, "Maximum number of results to return", false),
                ("skip", ParamType::Integer, "Number of results to skip (for pagination)", false),
                ("orderby", ParamType::String, "Sort order, e.g. 'name asc'", false),
            ]),
        },
    ]
}

/// Check that `get_schema` received no usable arguments beyond an empty object
pub fn validate_no_input(tool: &'static str, args: Option<&Value>) -> Result<(), ToolError> {
    match args {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(other) => Err(ToolError::InvalidArguments {
            tool,
            message: format!("expected an object, got {}", json_type(other)),
        }),
    }
}

/// Validate raw arguments for a query tool. Only shape and types are
/// checked; OData expressions are forwarded untouched.
pub fn validate_query_input(
    tool: &'static str,
    args: Option<&Value>,
) -> Result<QueryInput, ToolError> {
    match args {
        None | Some(Value::Null) => Ok(QueryInput::default()),
        Some(value @ Value::Object(_)) => {
            QueryInput::deserialize(value).map_err(|e| ToolError::InvalidArguments {
                tool,
                message: e.to_string(),
            })
        }
        Some(other) => Err(ToolError::InvalidArguments {
            tool,
            message: format!("expected an object, got {}", json_type(other)),
        }),
    }
}

/// Fetch the schema and pretty-print it
pub async fn execute_get_schema(client: &ODataClient) -> Result<String, ToolError> {
    let schema = client.get_schema().await.map_err(|source| ToolError::Request {
        context: "Failed to get schema",
        source,
    })?;
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// Query orders and summarize the page
pub async fn execute_query_orders(
    client: &ODataClient,
    input: QueryInput,
) -> Result<String, ToolError> {
    let result = client
        .query_orders(&input.into())
        .await
        .map_err(|source| ToolError::Request {
            context: "Failed to query orders",
            source,
        })?;
    summarize(&result, "order(s)")
}

/// Query payment terms and summarize the page
pub async fn execute_query_payment_terms(
    client: &ODataClient,
    input: QueryInput,
) -> Result<String, ToolError> {
    let result = client
        .query_payment_terms(&input.into())
        .await
        .map_err(|source| ToolError::Request {
            context: "Failed to query payment terms",
            source,
        })?;
    summarize(&result, "payment term(s)")
}

fn summarize(result: &QueryResult, noun: &str) -> Result<String, ToolError> {
    let count = result.objects.len();
    let total_size = result.total();

    let mut summary = format!("Found {} {}", count, noun);
    if total_size != count as u64 {
        summary.push_str(&format!(" out of {} total", total_size));
    }
    summary.push('.');
    if !result.is_done() {
        summary.push_str(" More results are available; use skip to fetch the next page.");
    }

    let payload = QuerySummary {
        summary,
        count,
        total_size,
        done: result.is_done(),
        data: &result.objects,
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
