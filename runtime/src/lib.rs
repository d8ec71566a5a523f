//! # Waypoint Runtime
//!
//! Runtime implementation for the Waypoint reducer architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state cell, runs the reducer and executes effects
//! - **Feedback Loop**: Actions produced by effects are dispatched depth-first,
//!   before the next effect of the same batch runs
//! - **Subscriptions**: A watch channel of state snapshots and a broadcast
//!   channel of every dispatched action
//!
//! Dispatch is synchronous and runs to completion: when [`Store::send`]
//! returns, every effect it caused has been executed.
//!
//! ## Example
//!
//! ```ignore
//! use waypoint_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use std::sync::Arc;
use std::time::Instant;
use waypoint_core::{effect::Effect, reducer::Reducer, SmallVec};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept feeding actions back past the configured depth
        ///
        /// This almost always means a reducer answers an action with an
        /// effect that produces the same action again.
        #[error("Feedback depth {depth} exceeded while dispatching {action}")]
        FeedbackDepthExceeded {
            /// Depth at which dispatch was abandoned
            depth: usize,
            /// Debug rendering of the dropped action
            action: String,
        },
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use waypoint_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_action_broadcast_capacity(64)
///     .with_max_feedback_depth(8);
/// assert_eq!(config.action_broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of actions buffered for slow action subscribers
    pub action_broadcast_capacity: usize,
    /// Maximum nesting of effect-produced actions for a single `send`
    pub max_feedback_depth: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(action_broadcast_capacity: usize, max_feedback_depth: usize) -> Self {
        Self {
            action_broadcast_capacity,
            max_feedback_depth,
        }
    }

    /// Set the action broadcast capacity (clamped to at least 1)
    #[must_use]
    pub const fn with_action_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.action_broadcast_capacity = capacity;
        self
    }

    /// Set the maximum feedback depth
    #[must_use]
    pub const fn with_max_feedback_depth(mut self, depth: usize) -> Self {
        self.max_feedback_depth = depth;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            action_broadcast_capacity: 16,
            max_feedback_depth: 32,
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{Arc, Effect, Instant, Reducer, SmallVec, StoreConfig, StoreError};
    use tokio::sync::{broadcast, watch};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (inside a watch channel, so every mutation is observable)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a Store is cheap and yields a handle to the same state.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<watch::Sender<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        config: StoreConfig,
        /// Every dispatched action, in dispatch order.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                config: self.config,
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        A: Clone + std::fmt::Debug,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (state, _) = watch::channel(initial_state);
            let (action_broadcast, _) = broadcast::channel(config.action_broadcast_capacity.max(1));

            Self {
                state: Arc::new(state),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                config,
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer, then executes the returned effects in order.
        /// Actions produced by effects are dispatched before the next effect
        /// runs. Returns once the whole cascade has completed.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackDepthExceeded`] if effect-produced
        /// actions nest deeper than [`StoreConfig::max_feedback_depth`]. State
        /// changes made before that point are kept.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&self, action: A) -> Result<(), StoreError> {
            self.dispatch(action, 0)
        }

        fn dispatch(&self, action: A, depth: usize) -> Result<(), StoreError> {
            if depth > self.config.max_feedback_depth {
                tracing::error!(depth, ?action, "Feedback depth exceeded, dropping action");
                metrics::counter!("store.feedback.depth_exceeded").increment(1);
                return Err(StoreError::FeedbackDepthExceeded {
                    depth,
                    action: format!("{action:?}"),
                });
            }

            tracing::debug!(depth, ?action, "Processing action");
            metrics::counter!("store.actions.total").increment(1);

            // No subscribers is fine
            let _ = self.action_broadcast.send(action.clone());

            let mut effects = SmallVec::new();
            {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = Instant::now();
                self.state.send_modify(|state| {
                    effects = self.reducer.reduce(state, action, &self.environment);
                });
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
            }

            for effect in effects {
                self.execute_effect(effect, depth)?;
            }

            Ok(())
        }

        fn execute_effect(&self, effect: Effect<A>, depth: usize) -> Result<(), StoreError> {
            metrics::counter!("store.effects.executed", "type" => effect.kind()).increment(1);

            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Sequential(effects) => {
                    tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                    for effect in effects {
                        self.execute_effect(effect, depth)?;
                    }
                },
                Effect::Send(action) => {
                    self.dispatch(action, depth + 1)?;
                },
                Effect::Run(thunk) => {
                    tracing::trace!("Executing Effect::Run");
                    if let Some(action) = thunk() {
                        tracing::trace!("Effect::Run produced an action, feeding back");
                        self.dispatch(action, depth + 1)?;
                    }
                },
            }

            Ok(())
        }

        /// Read current state via a closure
        ///
        /// The state is borrowed for the duration of the closure; do not call
        /// [`Store::send`] from inside it.
        ///
        /// ```ignore
        /// let ready = store.state(|s| s.status.is_ready());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            f(&self.state.borrow())
        }

        /// Subscribe to state snapshots
        ///
        /// The receiver is marked changed after every dispatched action,
        /// including actions the reducer ignores.
        #[must_use]
        pub fn subscribe(&self) -> watch::Receiver<S> {
            self.state.subscribe()
        }

        /// Subscribe to every action dispatched through this store
        ///
        /// Includes the initial action passed to [`Store::send`] and all
        /// actions fed back by effects, in dispatch order.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Access the injected environment
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.environment
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> StoreConfig {
            self.config
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can unwrap

    use super::*;
    use waypoint_core::{smallvec, SmallVec};

    #[derive(Clone, Debug, Default, PartialEq)]
    struct CountState {
        count: i64,
        log: Vec<&'static str>,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum CountAction {
        Increment,
        IncrementThenLog,
        Log(&'static str),
        Forever,
    }

    struct CountReducer;

    impl Reducer for CountReducer {
        type State = CountState;
        type Action = CountAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut CountState,
            action: CountAction,
            _env: &(),
        ) -> SmallVec<[Effect<CountAction>; 4]> {
            match action {
                CountAction::Increment => {
                    state.count += 1;
                    SmallVec::new()
                },
                CountAction::IncrementThenLog => smallvec![
                    Effect::Send(CountAction::Increment),
                    Effect::run(|| Some(CountAction::Log("ran"))),
                    Effect::Send(CountAction::Log("sent")),
                ],
                CountAction::Log(entry) => {
                    state.log.push(entry);
                    SmallVec::new()
                },
                CountAction::Forever => smallvec![Effect::Send(CountAction::Forever)],
            }
        }
    }

    #[test]
    fn test_send_updates_state() {
        let store = Store::new(CountState::default(), CountReducer, ());
        store.send(CountAction::Increment).unwrap();
        store.send(CountAction::Increment).unwrap();
        assert_eq!(store.state(|s| s.count), 2);
    }

    #[test]
    fn test_effects_run_in_order() {
        let store = Store::new(CountState::default(), CountReducer, ());
        store.send(CountAction::IncrementThenLog).unwrap();

        store.state(|s| {
            assert_eq!(s.count, 1);
            assert_eq!(s.log, vec!["ran", "sent"]);
        });
    }

    #[test]
    fn test_actions_are_broadcast_in_dispatch_order() {
        let store = Store::new(CountState::default(), CountReducer, ());
        let mut actions = store.subscribe_actions();

        store.send(CountAction::IncrementThenLog).unwrap();

        let mut seen = Vec::new();
        while let Ok(action) = actions.try_recv() {
            seen.push(action);
        }
        assert_eq!(
            seen,
            vec![
                CountAction::IncrementThenLog,
                CountAction::Increment,
                CountAction::Log("ran"),
                CountAction::Log("sent"),
            ]
        );
    }

    #[test]
    fn test_subscribe_observes_snapshots() {
        let store = Store::new(CountState::default(), CountReducer, ());
        let mut snapshots = store.subscribe();
        assert!(!snapshots.has_changed().unwrap());

        store.send(CountAction::Increment).unwrap();

        assert!(snapshots.has_changed().unwrap());
        assert_eq!(snapshots.borrow_and_update().count, 1);
    }

    #[test]
    fn test_runaway_feedback_is_cut_off() {
        let config = StoreConfig::default().with_max_feedback_depth(4);
        let store = Store::with_config(CountState::default(), CountReducer, (), config);

        let result = store.send(CountAction::Forever);
        assert!(matches!(
            result,
            Err(StoreError::FeedbackDepthExceeded { depth: 5, .. })
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let store = Store::new(CountState::default(), CountReducer, ());
        let handle = store.clone();
        handle.send(CountAction::Increment).unwrap();
        assert_eq!(store.state(|s| s.count), 1);
    }

    #[test]
    fn test_zero_broadcast_capacity_is_clamped() {
        let config = StoreConfig::new(0, 8);
        let store = Store::with_config(CountState::default(), CountReducer, (), config);
        let mut actions = store.subscribe_actions();
        store.send(CountAction::Increment).unwrap();
        assert_eq!(actions.try_recv().unwrap(), CountAction::Increment);
    }
}
