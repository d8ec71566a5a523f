//! Router actions: commands (intents) and events (facts).

use crate::route::{Params, ParsedRoute, RouteTarget};
use crate::state::ErrorKind;
use crate::table::RouteTable;
use waypoint_macros::Action;

/// Everything the router reducer reacts to.
///
/// Commands are issued by the host (directly or through
/// [`Router`](crate::Router)) and turn into effects. Events are produced by
/// those effects and drive the state machine. Events that do not apply to the
/// current state are ignored.
#[derive(Action, Clone, Debug, PartialEq)]
pub enum RouterAction<U> {
    // ═══════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════

    /// Store the route table and settle on the current URL.
    #[command]
    Initialize {
        /// Route table to use from now on.
        routes: RouteTable<U>,
    },

    /// Push a new history entry for a target.
    #[command]
    NavigateTo {
        /// Where to go.
        target: RouteTarget,
    },

    /// Hard-redirect to a target.
    #[command]
    RedirectTo {
        /// Where to go.
        target: RouteTarget,
    },

    /// Traverse one entry back.
    #[command]
    NavigateBack,

    /// Traverse one entry forward.
    #[command]
    NavigateForward,

    /// The user moved through history; re-read the URL.
    #[command]
    PopState,

    /// Merge query parameters into the current route and replace the URL.
    #[command]
    UpdateParams {
        /// New values, merged over the current ones.
        params: Params,
    },

    // ═══════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════

    /// The current URL matched a route at initialization.
    #[event]
    RouterInitialized {
        /// The matched route.
        route: ParsedRoute,
        /// Route table to store.
        routes: RouteTable<U>,
    },

    /// A navigation towards `route` began.
    #[event]
    NavigationStarted {
        /// Candidate route.
        route: ParsedRoute,
    },

    /// A navigation settled on `route`.
    #[event]
    NavigationResolved {
        /// Route read back from the host.
        route: ParsedRoute,
    },

    /// A navigation failed.
    #[event]
    NavigationRejected {
        /// Human-readable reason.
        message: String,
        /// Failure category.
        kind: ErrorKind,
        /// Route to show instead of the in-progress candidate.
        route: Option<ParsedRoute>,
    },

    /// No template matches the URL.
    #[event]
    RouteNotFoundDetected {
        /// The unmatched path.
        requested_path: String,
        /// Route table found during initialization, if that is where this
        /// came from.
        routes: Option<RouteTable<U>>,
    },

    /// The user moved through history and the URL matched `route`.
    #[event]
    BrowserNavigationDetected {
        /// The matched route.
        route: ParsedRoute,
    },
}
