//! The router handle hosts hold on to.

use crate::actions::RouterAction;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::guard::{check_route_access, GuardResult};
use crate::history::History;
use crate::navigation::NavigationEffects;
use crate::reducer::{RouterEnvironment, RouterReducer};
use crate::route::{Params, ParsedRoute, RouteTarget};
use crate::state::{RouterState, RouterStatus};
use crate::table::RouteTable;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use waypoint_runtime::{Store, StoreConfig, StoreError};

/// The store type backing a [`Router`].
pub type RouterStore<H, U> =
    Store<RouterState<U>, RouterAction<U>, RouterEnvironment<H>, RouterReducer<H, U>>;

/// A client-side router over host history `H`, for users of type `U`.
///
/// Explicitly constructed and passed around by the host; there is no global
/// instance. Every operation runs to completion before returning: by the time
/// `navigate_to` returns, the state reflects the outcome.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use waypoint_router::mocks::MemoryHistory;
/// use waypoint_router::{RouteConfig, RouteTable, Router, RouterConfig};
///
/// let history = Arc::new(MemoryHistory::new("http://localhost:3000/"));
/// let router: Router<_> = Router::new(history, RouterConfig::default()).unwrap();
///
/// router.initialize(
///     RouteTable::new()
///         .route("/", RouteConfig::new())
///         .route("/clients/:id", RouteConfig::new()),
/// );
/// router.navigate_to("/clients/42");
///
/// let route = router.current_route().unwrap();
/// assert_eq!(route.template, "/clients/:id");
/// assert_eq!(route.route_param("id"), Some("42"));
/// ```
pub struct Router<H, U = ()>
where
    H: History + 'static,
    U: Send + Sync + 'static,
{
    store: Arc<RouterStore<H, U>>,
    navigation: Arc<NavigationEffects<H>>,
    config: RouterConfig,
    listening: Arc<AtomicBool>,
}

impl<H, U> Router<H, U>
where
    H: History + 'static,
    U: Clone + Debug + Send + Sync + 'static,
{
    /// Create a router in the `Initial` state.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidBaseUrl`] if the configured base URL
    /// does not parse.
    pub fn new(history: Arc<H>, config: RouterConfig) -> Result<Self, RouterError> {
        Self::with_store_config(history, config, StoreConfig::default())
    }

    /// Create a router with custom store configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidBaseUrl`] if the configured base URL
    /// does not parse.
    pub fn with_store_config(
        history: Arc<H>,
        config: RouterConfig,
        store_config: StoreConfig,
    ) -> Result<Self, RouterError> {
        let navigation = Arc::new(NavigationEffects::new(history, &config)?);
        let store = Store::with_config(
            RouterState::default(),
            RouterReducer::new(),
            RouterEnvironment::new(Arc::clone(&navigation)),
            store_config,
        );

        Ok(Self {
            store: Arc::new(store),
            navigation,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Store `routes` and settle on the current URL.
    pub fn initialize(&self, routes: RouteTable<U>) {
        self.dispatch(RouterAction::Initialize { routes });
    }

    /// Navigate to a path, URL or template descriptor, pushing a history entry.
    pub fn navigate_to(&self, target: impl Into<RouteTarget>) {
        self.dispatch(RouterAction::NavigateTo {
            target: target.into(),
        });
    }

    /// Hard-redirect to a path, URL or template descriptor.
    pub fn redirect_to(&self, target: impl Into<RouteTarget>) {
        self.dispatch(RouterAction::RedirectTo {
            target: target.into(),
        });
    }

    /// Traverse one history entry back.
    pub fn navigate_back(&self) {
        self.dispatch(RouterAction::NavigateBack);
    }

    /// Traverse one history entry forward.
    pub fn navigate_forward(&self) {
        self.dispatch(RouterAction::NavigateForward);
    }

    /// Re-read the URL after user-driven traversal.
    pub fn on_pop_state(&self) {
        self.dispatch(RouterAction::PopState);
    }

    /// Merge query parameters into the current route. Only acts when `Ready`.
    pub fn update_params(&self, params: Params) {
        self.dispatch(RouterAction::UpdateParams { params });
    }

    /// Check `user` against the stored configuration of `template`.
    ///
    /// Returns `None` for undeclared templates.
    #[must_use]
    pub fn check_route_access(&self, template: &str, user: Option<&U>) -> Option<GuardResult> {
        self.store.state(|state| {
            state
                .routes
                .get(template)
                .map(|config| check_route_access(config, user))
        })
    }

    /// Send any action through the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the feedback loop runs away.
    pub fn send(&self, action: RouterAction<U>) -> Result<(), StoreError> {
        self.store.send(action)
    }

    /// Snapshot of the current status.
    #[must_use]
    pub fn status(&self) -> RouterStatus {
        self.store.state(|state| state.status.clone())
    }

    /// The route carried by the current status, if any.
    #[must_use]
    pub fn current_route(&self) -> Option<ParsedRoute> {
        self.store.state(|state| state.current_route().cloned())
    }

    /// Read the state without cloning it.
    pub fn with_state<T>(&self, f: impl FnOnce(&RouterState<U>) -> T) -> T {
        self.store.state(f)
    }

    /// Subscribe to state snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RouterState<U>> {
        self.store.subscribe()
    }

    /// Subscribe to every dispatched action, commands and events alike.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<RouterAction<U>> {
        self.store.subscribe_actions()
    }

    /// Register with the host's pop-state source so user-driven traversal
    /// reaches [`on_pop_state`](Self::on_pop_state).
    ///
    /// Registers at most once per router, clones included. Returns false when
    /// disabled by [`RouterConfig::pop_state_listener`] or already listening.
    /// The listener holds a weak handle and goes quiet once the router is
    /// dropped.
    pub fn listen(&self) -> bool {
        if !self.config.pop_state_listener {
            tracing::debug!("Pop-state listener disabled by configuration");
            return false;
        }
        if self.listening.swap(true, Ordering::SeqCst) {
            tracing::debug!("Pop-state listener already registered");
            return false;
        }

        let store = Arc::downgrade(&self.store);
        self.navigation.history().on_pop_state(Box::new(move || {
            if let Some(store) = store.upgrade() {
                if let Err(error) = store.send(RouterAction::PopState) {
                    tracing::error!(%error, "Failed to handle pop state");
                }
            }
        }));
        true
    }

    /// Navigation effects, for URL building and inspection.
    #[must_use]
    pub fn navigation(&self) -> &NavigationEffects<H> {
        &self.navigation
    }

    /// The configuration this router was built with.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn dispatch(&self, action: RouterAction<U>) {
        let name = action.action_name();
        if let Err(error) = self.store.send(action) {
            tracing::error!(action = name, %error, "Router dispatch failed");
        }
    }
}

impl<H, U> Clone for Router<H, U>
where
    H: History + 'static,
    U: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            navigation: Arc::clone(&self.navigation),
            config: self.config.clone(),
            listening: Arc::clone(&self.listening),
        }
    }
}

impl<H, U> Debug for Router<H, U>
where
    H: History + 'static,
    U: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("navigation", &self.navigation)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
