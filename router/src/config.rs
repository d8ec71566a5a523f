//! Router configuration.
//!
//! Configuration values are provided by the host application, not hardcoded.

use crate::error::RouterError;
use crate::table::{RouteConfig, RouteTable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Application base URL (e.g., "https://app.example.com/admin").
    ///
    /// Built URLs are `{base_url}{path}`, and its path prefix is stripped
    /// when reading the current path.
    ///
    /// Default: `http://localhost:3000`
    pub base_url: String,

    /// Whether [`Router::listen`](crate::Router::listen) should register with
    /// the host's pop-state source.
    ///
    /// Default: true
    pub pop_state_listener: bool,
}

impl RouterConfig {
    /// Create new router configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for your application (e.g., "https://app.example.com")
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pop_state_listener: true,
        }
    }

    /// Enable or disable the pop-state listener.
    #[must_use]
    pub const fn with_pop_state_listener(mut self, enabled: bool) -> Self {
        self.pop_state_listener = enabled;
        self
    }

    /// Parse and validate the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidBaseUrl`] if the base URL is not an
    /// absolute URL.
    pub fn parsed_base_url(&self) -> Result<Url, RouterError> {
        Ok(Url::parse(&self.base_url)?)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

/// Serialized form of one route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntryConfig {
    /// Expected query parameter names.
    #[serde(default)]
    pub params: Vec<String>,

    /// Whether the route requires an authenticated user.
    #[serde(default)]
    pub requires_auth: bool,
}

/// Serialized form of a route table, keyed by template in declared order.
///
/// ```json
/// { "/users/:id": { "params": ["tab"], "requiresAuth": true } }
/// ```
///
/// Guards cannot be serialized; attach them with
/// [`RouteTable::guard`] after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTableConfig {
    /// Routes by template.
    pub routes: IndexMap<String, RouteEntryConfig>,
}

impl<U> From<RouteTableConfig> for RouteTable<U> {
    fn from(config: RouteTableConfig) -> Self {
        config
            .routes
            .into_iter()
            .map(|(template, entry)| {
                let mut route = RouteConfig::new().with_query_params(entry.params);
                route.requires_authentication = entry.requires_auth;
                (template, route)
            })
            .collect()
    }
}

impl<U> From<&RouteTable<U>> for RouteTableConfig {
    fn from(table: &RouteTable<U>) -> Self {
        Self {
            routes: table
                .iter()
                .map(|(template, config)| {
                    (
                        template.to_string(),
                        RouteEntryConfig {
                            params: config.expected_query_params.clone(),
                            requires_auth: config.requires_authentication,
                        },
                    )
                })
                .collect(),
        }
    }
}
