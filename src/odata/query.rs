//! OData query string builder

/// Query options for OData requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub select: Option<String>,
    pub filter: Option<String>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
    pub orderby: Option<String>,
    pub count: bool, // false is never sent
}

impl QueryOptions {
    /// Build query string from options.
    ///
    /// Parameters are always emitted in the order `$select`, `$filter`,
    /// `$top`, `$skip`, `$orderby`, `$count`. Returns an empty string when
    /// nothing is set, otherwise a string starting with `?`. The contents of
    /// `select`, `filter` and `orderby` are percent-encoded but never checked
    /// against the OData grammar.
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();

        if let Some(select) = non_empty(&self.select) {
            params.push(format!("$select={}", urlencoding::encode(select)));
        }

        if let Some(filter) = non_empty(&self.filter) {
            params.push(format!("$filter={}", urlencoding::encode(filter)));
        }

        if let Some(top) = self.top {
            params.push(format!("$top={}", top));
        }

        if let Some(skip) = self.skip {
            params.push(format!("$skip={}", skip));
        }

        if let Some(orderby) = non_empty(&self.orderby) {
            params.push(format!("$orderby={}", urlencoding::encode(orderby)));
        }

        if self.count {
            params.push("$count=true".to_string());
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
