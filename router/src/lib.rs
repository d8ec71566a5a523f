//! # Waypoint Router
//!
//! Client-side routing built on the Waypoint reducer architecture.
//!
//! ## Components
//!
//! - [`matcher`]: matches `:param` templates against concrete paths
//! - [`RouteTable`]: templates in declared order, each with expected query
//!   parameters, an authentication flag and an optional guard
//! - [`parser`]: resolves URL strings and template descriptors to a
//!   [`ParsedRoute`]
//! - [`NavigationEffects`]: reads and changes the URL through a host
//!   [`History`]
//! - [`RouterState`] / [`RouterReducer`]: the navigation state machine
//! - [`Router`]: the handle hosts use
//! - [`check_route_access`]: authentication-first guard evaluation
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use waypoint_router::mocks::MemoryHistory;
//! use waypoint_router::{ErrorKind, RouteConfig, RouteTable, Router, RouterConfig, RouterStatus};
//!
//! let history = Arc::new(MemoryHistory::new("http://localhost:3000/clients?search=ann"));
//! let router: Router<_> = Router::new(Arc::clone(&history), RouterConfig::default()).unwrap();
//!
//! router.initialize(
//!     RouteTable::new()
//!         .route("/", RouteConfig::new())
//!         .route("/clients", RouteConfig::new().with_query_params(["search", "page"])),
//! );
//! assert_eq!(router.current_route().unwrap().query_param("search"), Some("ann"));
//!
//! router.navigate_to("/settings");
//! assert!(matches!(
//!     router.status(),
//!     RouterStatus::NavigationFailure { error_kind: ErrorKind::InvalidPattern, .. }
//! ));
//! assert_eq!(history.len(), 1);
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod guard;
pub mod history;
pub mod matcher;
pub mod mocks;
pub mod navigation;
pub mod parser;
pub mod reducer;
pub mod route;
pub mod router;
pub mod state;
pub mod table;

pub use actions::RouterAction;
pub use config::{RouteEntryConfig, RouteTableConfig, RouterConfig};
pub use error::RouterError;
pub use guard::{check_route_access, DenialReason, Guard, GuardError, GuardResult};
pub use history::{History, HistoryError, PopStateListener};
pub use matcher::{match_route, RouteMatch};
pub use navigation::{NavigationEffects, NavigationError};
pub use reducer::{RouterEnvironment, RouterReducer};
pub use route::{params, Params, ParsedRoute, RouteTarget};
pub use router::{Router, RouterStore};
pub use state::{ErrorKind, RouterState, RouterStatus};
pub use table::{RouteConfig, RouteTable};
pub use waypoint_runtime::{StoreConfig, StoreError};
