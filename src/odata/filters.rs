//! Helpers for composing OData `$filter` expressions
//!
//! These only format strings; nothing is validated. String operands are
//! wrapped in single quotes with embedded quotes doubled, numbers and
//! booleans are written bare.

use std::fmt;

/// Numeric operand for comparisons
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{}", n),
            Number::Float(n) => write!(f, "{}", n),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Integer(n.into())
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Integer(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::Integer(n.into())
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

/// Operand for equality filters
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => write!(f, "{}", quote(s)),
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<Number> for FilterValue {
    fn from(n: Number) -> Self {
        FilterValue::Number(n)
    }
}

macro_rules! numeric_filter_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(n: $t) -> Self {
                    FilterValue::Number(n.into())
                }
            }
        )*
    };
}

numeric_filter_value!(i32, i64, u32, f64);

/// Quote a string literal, doubling any embedded single quote
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `field eq value`
pub fn eq(field: &str, value: impl Into<FilterValue>) -> String {
    format!("{} eq {}", field, value.into())
}

/// `field ne value`
pub fn ne(field: &str, value: impl Into<FilterValue>) -> String {
    format!("{} ne {}", field, value.into())
}

/// `field gt value`
pub fn gt(field: &str, value: impl Into<Number>) -> String {
    format!("{} gt {}", field, value.into())
}

/// `field ge value`
pub fn ge(field: &str, value: impl Into<Number>) -> String {
    format!("{} ge {}", field, value.into())
}

/// `field lt value`
pub fn lt(field: &str, value: impl Into<Number>) -> String {
    format!("{} lt {}", field, value.into())
}

/// `field le value`
pub fn le(field: &str, value: impl Into<Number>) -> String {
    format!("{} le {}", field, value.into())
}

/// Join fragments with `and`
pub fn and<I, S>(filters: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    join(filters, " and ")
}

/// Join fragments with `or`, parenthesized so the result can be combined
/// with `and` safely
pub fn or<I, S>(filters: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("({})", join(filters, " or "))
}

/// Topz full-text search pseudo-field: `search eq 'value'`
pub fn search(value: &str) -> String {
    format!("search eq {}", quote(value))
}

fn join<I, S>(filters: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    filters
        .into_iter()
        .map(|f| f.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_quotes_strings_only() {
        assert_eq!(eq("status", "Active"), "status eq 'Active'");
        assert_eq!(eq("total", 100), "total eq 100");
        assert_eq!(eq("active", true), "active eq true");
        assert_eq!(ne("order_status", "Closed"), "order_status ne 'Closed'");
    }

    #[test]
    fn test_comparisons_never_quote() {
        assert_eq!(gt("total", 300000), "total gt 300000");
        assert_eq!(ge("cost", 20000), "cost ge 20000");
        assert_eq!(lt("sales_tax", 2.5), "sales_tax lt 2.5");
        assert_eq!(le("total", 1000.0), "total le 1000");
    }

    #[test]
    fn test_or_is_parenthesized() {
        assert_eq!(or([eq("a", "1"), eq("b", "2")]), "(a eq '1' or b eq '2')");
    }

    #[test]
    fn test_and_composes_with_or() {
        let filter = or([
            and([gt("total", 20000), gt("cost", 20000)]),
            gt("sales_tax", 3000),
        ]);
        assert_eq!(
            filter,
            "(total gt 20000 and cost gt 20000 or sales_tax gt 3000)"
        );

        let filter = and([
            gt("total", 10000),
            eq("order_status", "Active Project - In-Progress"),
        ]);
        assert_eq!(
            filter,
            "total gt 10000 and order_status eq 'Active Project - In-Progress'"
        );
    }

    #[test]
    fn test_search() {
        assert_eq!(search("Gordon Square"), "search eq 'Gordon Square'");
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        assert_eq!(eq("creator", "O'Brien, Pat"), "creator eq 'O''Brien, Pat'");
        assert_eq!(search("it's"), "search eq 'it''s'");
    }
}
