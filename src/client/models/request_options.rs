//! # Request Options
//!
//! Filter, sort and pagination options for collection queries.

use std::collections::BTreeMap;

/// Parameters with a dedicated option; filters never emit them
const RESERVED_PARAMS: [&str; 3] = ["page", "size", "sort"];

/// Query options converted to request parameters.
///
/// Scalar options come first, in a stable order, followed by one `sort`
/// parameter per sort entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// Sort entries such as `id,asc`
    pub sort: Vec<String>,
    /// Free-form filters such as `titulo.contains=Casmurro`
    pub filters: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort.push(sort.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Convert to ordered query parameters
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            params.push(("size".to_string(), size.to_string()));
        }
        for (key, value) in &self.filters {
            if RESERVED_PARAMS.contains(&key.as_str()) {
                tracing::warn!("Ignoring filter '{}': use the dedicated option", key);
                continue;
            }
            params.push((key.clone(), value.clone()));
        }
        for sort in &self.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        params
    }
}

/// Parameters for optional options; absent options produce none
pub fn create_request_params(options: Option<&RequestOptions>) -> Vec<(String, String)> {
    options.map(RequestOptions::to_params).unwrap_or_default()
}
