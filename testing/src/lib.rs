//! # Waypoint Testing
//!
//! Testing utilities and helpers for the Waypoint reducer architecture.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Assertion helpers for effect descriptions
//! - Tracing setup for tests
//! - Property-based testing strategies for path-like data
//!
//! ## Example
//!
//! ```ignore
//! use waypoint_testing::{ReducerTest, assertions};
//!
//! #[test]
//! fn initialized_router_is_ready() {
//!     ReducerTest::new(RouterReducer::new())
//!         .with_env(test_environment())
//!         .given_state(RouterState::default())
//!         .when_action(RouterAction::RouterInitialized { route, routes })
//!         .then_state(|state| assert!(state.is_ready()))
//!         .then_effects(assertions::assert_no_effects)
//!         .run();
//! }
//! ```

pub mod reducer_test;

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly tracing subscriber
    ///
    /// Honors `RUST_LOG` and defaults to `warn`. Safe to call from every
    /// test: only the first call installs the subscriber.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities
///
/// Strategies for generating path-shaped data with proptest.
pub mod properties {
    use proptest::prelude::*;

    /// A literal path segment: non-empty, no `/`, never starting with `:`
    pub fn literal_segment() -> impl Strategy<Value = String> {
        "[a-z0-9][a-z0-9_-]{0,7}"
    }

    /// A parameter name usable after `:` in a template
    pub fn param_name() -> impl Strategy<Value = String> {
        "[a-z][a-zA-Z0-9]{0,5}"
    }

    /// A concrete path segment value, including percent-escapes and spaces
    pub fn segment_value() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 %._~-]{1,12}"
    }

    /// A template segment: either a literal or a `:name` placeholder
    pub fn template_segment() -> impl Strategy<Value = TemplateSegment> {
        prop_oneof![
            literal_segment().prop_map(TemplateSegment::Literal),
            param_name().prop_map(TemplateSegment::Param),
        ]
    }

    /// One segment of a generated template
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TemplateSegment {
        /// Must match byte-for-byte
        Literal(String),
        /// Binds any segment under this name
        Param(String),
    }

    impl TemplateSegment {
        /// Render the segment as it appears in a template
        #[must_use]
        pub fn render(&self) -> String {
            match self {
                Self::Literal(text) => text.clone(),
                Self::Param(name) => format!(":{name}"),
            }
        }
    }
}

// Re-export commonly used items
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
mod tests {
    use super::properties::TemplateSegment;

    #[test]
    fn test_template_segment_render() {
        assert_eq!(TemplateSegment::Literal("users".into()).render(), "users");
        assert_eq!(TemplateSegment::Param("id".into()).render(), ":id");
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        super::helpers::init_tracing();
        super::helpers::init_tracing();
    }
}
