//! Router reducer.
//!
//! Commands become effect descriptions; events drive the state machine.
//!
//! # Transitions
//!
//! | From | Event | To |
//! |---|---|---|
//! | Initial | `RouterInitialized` | Ready, table stored |
//! | Initial | `RouteNotFoundDetected` | RouteNotFound |
//! | Ready | `NavigationStarted` | NavigationInProgress |
//! | Ready | `NavigationRejected` | NavigationFailure (keeps current route) |
//! | Ready | `BrowserNavigationDetected` | Ready |
//! | Ready | `RouteNotFoundDetected` | RouteNotFound (keeps current route) |
//! | NavigationInProgress | `NavigationResolved` | Ready |
//! | NavigationInProgress | `NavigationRejected` | NavigationFailure (event route, else current) |
//! | NavigationInProgress | `RouteNotFoundDetected` | RouteNotFound (keeps current route) |
//! | NavigationFailure, RouteNotFound | `NavigationStarted` | NavigationInProgress |
//! | NavigationFailure, RouteNotFound | `RouterInitialized` | Ready, table stored |
//! | NavigationFailure, RouteNotFound | `BrowserNavigationDetected` | Ready |
//!
//! Every other pair is ignored.
//!
//! # Effects
//!
//! Host interaction happens inside `Effect::Run` thunks so the reducer stays
//! pure. A thunk performs one history operation, re-reads the URL and returns
//! the resulting event.

use crate::actions::RouterAction;
use crate::history::{History, HistoryError};
use crate::navigation::NavigationEffects;
use crate::route::{Params, ParsedRoute, RouteTarget};
use crate::state::{ErrorKind, RouterState, RouterStatus};
use crate::table::RouteTable;
use std::marker::PhantomData;
use std::sync::Arc;
use waypoint_core::effect::Effect;
use waypoint_core::reducer::Reducer;
use waypoint_core::{run_effect, send_all, smallvec, SmallVec};

/// Template of the route shown while traversing back.
pub const BROWSER_BACK: &str = "browser_back";

/// Template of the route shown while traversing forward.
pub const BROWSER_FORWARD: &str = "browser_forward";

/// Dependencies injected into the router reducer.
pub struct RouterEnvironment<H> {
    /// Host navigation.
    pub navigation: Arc<NavigationEffects<H>>,
}

impl<H> RouterEnvironment<H> {
    /// Create a new environment.
    #[must_use]
    pub const fn new(navigation: Arc<NavigationEffects<H>>) -> Self {
        Self { navigation }
    }
}

impl<H> Clone for RouterEnvironment<H> {
    fn clone(&self) -> Self {
        Self {
            navigation: Arc::clone(&self.navigation),
        }
    }
}

/// Router reducer.
///
/// `H` is the host history, `U` the host's user type.
pub struct RouterReducer<H, U> {
    _phantom: PhantomData<fn() -> (H, U)>,
}

impl<H, U> RouterReducer<H, U> {
    /// Create a new router reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<H, U> Default for RouterReducer<H, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, U> Reducer for RouterReducer<H, U>
where
    H: History + 'static,
    U: Send + Sync + 'static,
{
    type State = RouterState<U>;
    type Action = RouterAction<U>;
    type Environment = RouterEnvironment<H>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let navigation = Arc::clone(&env.navigation);

        match action {
            // ═══════════════════════════════════════════════════════════
            // Initialize: read the URL against the new table
            // ═══════════════════════════════════════════════════════════
            RouterAction::Initialize { routes } => {
                tracing::debug!(routes = routes.len(), "Initializing router");
                smallvec![Effect::run(move || {
                    Some(match navigation.current_route(&routes) {
                        Some(route) => RouterAction::RouterInitialized { route, routes },
                        None => RouterAction::RouteNotFoundDetected {
                            requested_path: navigation.current_path(),
                            routes: Some(routes),
                        },
                    })
                })]
            },

            // ═══════════════════════════════════════════════════════════
            // NavigateTo / RedirectTo: validate, then push or redirect
            // ═══════════════════════════════════════════════════════════
            RouterAction::NavigateTo { target } => {
                let (route, invalid) = validate(&navigation, &target, &state.routes);
                if let Some(rejection) = invalid {
                    return smallvec![rejection];
                }

                let routes = state.routes.clone();
                let started = RouterAction::NavigationStarted {
                    route: route.clone(),
                };
                smallvec![
                    Effect::Send(started),
                    Effect::run(move || {
                        let pushed = navigation.navigate_to_route(
                            &route.template,
                            route.route_params.as_ref().unwrap_or(&Params::new()),
                            route.query_params.as_ref().unwrap_or(&Params::new()),
                        );
                        Some(match pushed {
                            Ok(()) => resolved_or_not_found(&navigation, &routes, route.path),
                            Err(error) => rejected(&error, ErrorKind::NavigationError, None),
                        })
                    })
                ]
            },

            RouterAction::RedirectTo { target } => {
                let (route, invalid) = validate(&navigation, &target, &state.routes);
                if let Some(rejection) = invalid {
                    return smallvec![rejection];
                }

                let routes = state.routes.clone();
                let started = RouterAction::NavigationStarted {
                    route: route.clone(),
                };
                smallvec![
                    Effect::Send(started),
                    Effect::run(move || {
                        let redirected = navigation.redirect_to_route(
                            &route.template,
                            route.route_params.as_ref().unwrap_or(&Params::new()),
                            route.query_params.as_ref().unwrap_or(&Params::new()),
                        );
                        match redirected {
                            // The host usually abandons us here; resolve if it didn't.
                            Ok(()) => navigation
                                .current_route(&routes)
                                .map(|route| RouterAction::NavigationResolved { route }),
                            Err(error) => Some(rejected(&error, ErrorKind::RedirectError, None)),
                        }
                    })
                ]
            },

            // ═══════════════════════════════════════════════════════════
            // NavigateBack / NavigateForward: host traversal
            // ═══════════════════════════════════════════════════════════
            RouterAction::NavigateBack => traverse(state, navigation, BROWSER_BACK, |navigation| {
                navigation.go_back()
            }),

            RouterAction::NavigateForward => {
                traverse(state, navigation, BROWSER_FORWARD, |navigation| {
                    navigation.go_forward()
                })
            },

            // ═══════════════════════════════════════════════════════════
            // PopState: user-driven traversal is trusted, no validation
            // ═══════════════════════════════════════════════════════════
            RouterAction::PopState => {
                let routes = state.routes.clone();
                smallvec![run_effect! {
                    Some(match navigation.current_route(&routes) {
                        Some(route) => RouterAction::BrowserNavigationDetected { route },
                        None => RouterAction::RouteNotFoundDetected {
                            requested_path: navigation.current_path(),
                            routes: None,
                        },
                    })
                }]
            },

            // ═══════════════════════════════════════════════════════════
            // UpdateParams: merge, filter, replace the URL
            // ═══════════════════════════════════════════════════════════
            RouterAction::UpdateParams { params } => {
                let Some(current) = state.ready_route() else {
                    tracing::trace!(status = state.status_name(), "UpdateParams outside Ready, ignored");
                    return SmallVec::new();
                };

                let expected = state
                    .routes
                    .get(&current.template)
                    .map(|config| config.expected_query_params.as_slice())
                    .unwrap_or_default();

                let mut merged = current.query_params.clone().unwrap_or_default();
                merged.extend(params);
                let filtered: Params = expected
                    .iter()
                    .filter_map(|name| merged.get(name).map(|value| (name.clone(), value.clone())))
                    .collect();

                let previous = current.clone();
                let mut candidate = current.clone();
                candidate.query_params = Some(filtered.clone());

                let routes = state.routes.clone();
                smallvec![
                    Effect::Send(RouterAction::NavigationStarted { route: candidate }),
                    Effect::run(move || {
                        let replaced = navigation.replace_route(
                            &previous.template,
                            previous.route_params.as_ref().unwrap_or(&Params::new()),
                            &filtered,
                        );
                        Some(match replaced {
                            Ok(()) => resolved_or_not_found(&navigation, &routes, previous.path.clone()),
                            Err(error) => {
                                rejected(&error, ErrorKind::NavigationError, Some(previous))
                            },
                        })
                    })
                ]
            },

            // ═══════════════════════════════════════════════════════════
            // Events
            // ═══════════════════════════════════════════════════════════
            event => {
                apply_event(state, event);
                SmallVec::new()
            },
        }
    }
}

/// Resolve a target against the base URL and check its template is declared.
///
/// Returns the resolved route, and for undeclared templates the effect that
/// starts and immediately rejects the navigation.
fn validate<H: History, U>(
    navigation: &NavigationEffects<H>,
    target: &RouteTarget,
    routes: &RouteTable<U>,
) -> (ParsedRoute, Option<Effect<RouterAction<U>>>) {
    let route = navigation.resolve_target(target, routes);
    if routes.contains(&route.template) {
        return (route, None);
    }

    tracing::warn!(template = %route.template, "Navigation to undeclared route");
    let message = format!("Invalid route pattern: {}", route.template);
    let effect = send_all![
        RouterAction::NavigationStarted {
            route: route.clone()
        },
        RouterAction::NavigationRejected {
            message,
            kind: ErrorKind::InvalidPattern,
            route: None,
        },
    ];
    (route, Some(effect))
}

fn traverse<H, U, F>(
    state: &RouterState<U>,
    navigation: Arc<NavigationEffects<H>>,
    marker: &'static str,
    step: F,
) -> SmallVec<[Effect<RouterAction<U>>; 4]>
where
    H: History + 'static,
    U: Send + Sync + 'static,
    F: FnOnce(&NavigationEffects<H>) -> Result<(), HistoryError> + Send + 'static,
{
    let last_ready = state.ready_route().cloned();
    let routes = state.routes.clone();

    smallvec![
        Effect::Send(RouterAction::NavigationStarted {
            route: ParsedRoute::literal(marker),
        }),
        Effect::run(move || {
            Some(match step(navigation.as_ref()) {
                Ok(()) => {
                    let requested_path = navigation.current_path();
                    resolved_or_not_found(&navigation, &routes, requested_path)
                },
                Err(error) => rejected(&error, ErrorKind::BrowserNavigationError, last_ready),
            })
        })
    ]
}

fn resolved_or_not_found<H: History, U>(
    navigation: &NavigationEffects<H>,
    routes: &RouteTable<U>,
    requested_path: String,
) -> RouterAction<U> {
    match navigation.current_route(routes) {
        Some(route) => RouterAction::NavigationResolved { route },
        None => RouterAction::RouteNotFoundDetected {
            requested_path,
            routes: None,
        },
    }
}

fn rejected<U>(
    error: &impl std::fmt::Display,
    kind: ErrorKind,
    route: Option<ParsedRoute>,
) -> RouterAction<U> {
    tracing::warn!(%error, %kind, "Navigation failed");
    RouterAction::NavigationRejected {
        message: error.to_string(),
        kind,
        route,
    }
}

/// Apply one event to the state machine.
fn apply_event<U>(state: &mut RouterState<U>, event: RouterAction<U>) {
    let event_name = event.action_name();
    let from = state.status_name();

    let next = match (&state.status, event) {
        (
            RouterStatus::Initial | RouterStatus::NavigationFailure { .. } | RouterStatus::RouteNotFound { .. },
            RouterAction::RouterInitialized { route, routes },
        ) => {
            state.routes = routes;
            Some(RouterStatus::Ready {
                current_route: route,
            })
        },

        (
            RouterStatus::Initial,
            RouterAction::RouteNotFoundDetected {
                requested_path,
                routes,
            },
        ) => {
            if let Some(routes) = routes {
                state.routes = routes;
            }
            Some(RouterStatus::RouteNotFound {
                current_route: None,
                requested_path: Some(requested_path),
            })
        },

        (
            RouterStatus::Ready { .. }
            | RouterStatus::NavigationFailure { .. }
            | RouterStatus::RouteNotFound { .. },
            RouterAction::NavigationStarted { route },
        ) => Some(RouterStatus::NavigationInProgress {
            current_route: Some(route),
        }),

        (
            RouterStatus::Ready { .. }
            | RouterStatus::NavigationFailure { .. }
            | RouterStatus::RouteNotFound { .. },
            RouterAction::BrowserNavigationDetected { route },
        ) => Some(RouterStatus::Ready {
            current_route: route,
        }),

        (RouterStatus::Ready { current_route }, RouterAction::NavigationRejected { message, kind, .. }) => {
            Some(RouterStatus::NavigationFailure {
                current_route: Some(current_route.clone()),
                error_message: message,
                error_kind: kind,
            })
        },

        (
            RouterStatus::NavigationInProgress { current_route },
            RouterAction::NavigationRejected {
                message,
                kind,
                route,
            },
        ) => Some(RouterStatus::NavigationFailure {
            current_route: route.or_else(|| current_route.clone()),
            error_message: message,
            error_kind: kind,
        }),

        (RouterStatus::Ready { current_route }, RouterAction::RouteNotFoundDetected { requested_path, .. }) => {
            Some(RouterStatus::RouteNotFound {
                current_route: Some(current_route.clone()),
                requested_path: Some(requested_path),
            })
        },

        (
            RouterStatus::NavigationInProgress { current_route },
            RouterAction::RouteNotFoundDetected { requested_path, .. },
        ) => Some(RouterStatus::RouteNotFound {
            current_route: current_route.clone(),
            requested_path: Some(requested_path),
        }),

        (RouterStatus::NavigationInProgress { .. }, RouterAction::NavigationResolved { route }) => {
            Some(RouterStatus::Ready {
                current_route: route,
            })
        },

        _ => None,
    };

    match next {
        Some(status) => {
            tracing::debug!(
                event = event_name,
                from,
                to = status.name(),
                template = status.current_route().map(|route| route.template.as_str()),
                "Router transition"
            );
            state.status = status;
        },
        None => tracing::trace!(event = event_name, status = from, "Event ignored in current state"),
    }
}
