//! # Waypoint Core
//!
//! Core traits and types for the Waypoint reducer architecture.
//!
//! This crate provides the abstractions the router is built from: a pure
//! state machine that reacts to actions and describes (but never performs)
//! its side effects.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature
//! - **Action**: All possible inputs to a reducer (commands and events)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```
//! use waypoint_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//!     IncrementTwice,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => {
//!                 state.count += 1;
//!                 SmallVec::new()
//!             },
//!             CounterAction::IncrementTwice => smallvec![
//!                 Effect::Send(CounterAction::Increment),
//!                 Effect::Send(CounterAction::Increment),
//!             ],
//!         }
//!     }
//! }
//!
//! let mut state = CounterState::default();
//! let effects = CounterReducer.reduce(&mut state, CounterAction::IncrementTwice, &());
//! assert_eq!(effects.len(), 2);
//! assert_eq!(state.count, 0); // effects are descriptions, nothing ran yet
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Effect construction macros
pub mod effect_macros;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for RouterReducer {
    ///     type State = RouterState;
    ///     type Action = RouterAction;
    ///     type Environment = RouterEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut RouterState,
    ///         action: RouterAction,
    ///         env: &RouterEnvironment,
    ///     ) -> SmallVec<[Effect<RouterAction>; 4]> {
    ///         match action {
    ///             RouterAction::PopState => {
    ///                 // Describe the host interaction, the store runs it
    ///                 smallvec![Effect::Run(Box::new(|| None))]
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime, in order
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution). The runtime executes them synchronously,
/// in order, feeding any produced action back into the reducer before moving
/// on to the next effect.
pub mod effect {
    /// Boxed synchronous computation that may produce a feedback action
    pub type Thunk<Action> = Box<dyn FnOnce() -> Option<Action> + Send>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects one after another
        Sequential(Vec<Effect<Action>>),

        /// Dispatch an action back into the reducer immediately
        Send(Action),

        /// Arbitrary synchronous computation against the environment
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Run(Thunk<Action>),
    }

    // Manual Debug implementation since closures don't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Send(action) => f.debug_tuple("Effect::Send").field(action).finish(),
                Effect::Run(_) => write!(f, "Effect::Run(<thunk>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap a closure as an [`Effect::Run`]
        #[must_use]
        pub fn run<F>(f: F) -> Effect<Action>
        where
            F: FnOnce() -> Option<Action> + Send + 'static,
        {
            Effect::Run(Box::new(f))
        }

        /// Returns true for [`Effect::None`] and empty sequences
        #[must_use]
        pub fn is_noop(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Sequential(effects) => effects.iter().all(Effect::is_noop),
                Effect::Send(_) | Effect::Run(_) => false,
            }
        }

        /// Short label for logs and metrics
        #[must_use]
        pub const fn kind(&self) -> &'static str {
            match self {
                Effect::None => "none",
                Effect::Sequential(_) => "sequential",
                Effect::Send(_) => "send",
                Effect::Run(_) => "run",
            }
        }
    }
}
