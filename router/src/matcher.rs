//! Template matching.
//!
//! Templates are `/`-separated; a segment starting with `:` binds the
//! corresponding path segment under the name that follows. Everything else
//! must match byte-for-byte. Values are bound raw, never percent-decoded.

use crate::route::Params;

/// Outcome of matching one template against one path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteMatch {
    /// Whether the path fits the template.
    pub matched: bool,
    /// Bound parameters; always empty when `matched` is false.
    pub params: Params,
}

impl RouteMatch {
    fn miss() -> Self {
        Self {
            matched: false,
            params: Params::new(),
        }
    }
}

/// Match `template` against a concrete `path`.
///
/// Total and pure: never panics, and a failed match discards any bindings
/// made before the mismatch. Trailing slashes are significant here; callers
/// normalize them first.
///
/// ```
/// use waypoint_router::matcher::match_route;
///
/// let hit = match_route("/users/:id", "/users/user%20123");
/// assert!(hit.matched);
/// assert_eq!(hit.params["id"], "user%20123");
///
/// assert!(!match_route("/users/:id", "/users/1/edit").matched);
/// ```
#[must_use]
pub fn match_route(template: &str, path: &str) -> RouteMatch {
    if template.split('/').count() != path.split('/').count() {
        return RouteMatch::miss();
    }

    let mut params = Params::new();
    for (template_segment, path_segment) in template.split('/').zip(path.split('/')) {
        if let Some(name) = template_segment.strip_prefix(':') {
            params.insert(name.to_string(), path_segment.to_string());
        } else if template_segment != path_segment {
            return RouteMatch::miss();
        }
    }

    RouteMatch {
        matched: true,
        params,
    }
}

/// Parameter names declared by a template, in order.
#[must_use]
pub fn template_param_names(template: &str) -> Vec<&str> {
    template
        .split('/')
        .filter_map(|segment| segment.strip_prefix(':'))
        .collect()
}

/// Substitute `:name` segments with values from `route_params`.
///
/// Values are inserted verbatim (no percent-encoding). Segments without a
/// supplied value are left as written.
///
/// ```
/// use waypoint_router::{matcher::fill_template, params};
///
/// let path = fill_template("/clients/:id/cars/:carId", &params([("id", "4"), ("carId", "2")]));
/// assert_eq!(path, "/clients/4/cars/2");
/// ```
#[must_use]
pub fn fill_template(template: &str, route_params: &Params) -> String {
    template
        .split('/')
        .map(|segment| {
            segment
                .strip_prefix(':')
                .and_then(|name| route_params.get(name))
                .map_or(segment, String::as_str)
        })
        .collect::<Vec<_>>()
        .join("/")
}
