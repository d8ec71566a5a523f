//! Given-When-Then harness for a single reducer step.
//!
//! A step is checked in three passes: the state after `reduce`, the effect
//! descriptions it returned, and (optionally) the actions its `Run` thunks
//! produce once executed. Thunks run last because running consumes them.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use waypoint_core::{effect::Effect, reducer::Reducer};

type StateCheck<S> = Box<dyn FnOnce(&S)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;
type OutcomeCheck<A> = Box<dyn FnOnce(&[A])>;

/// One reducer step under test.
///
/// # Example
///
/// ```ignore
/// use waypoint_testing::{assertions, ReducerTest};
///
/// ReducerTest::new(RouterReducer::new())
///     .with_env(environment(&history))
///     .given_state(ready("/"))
///     .when_action(RouterAction::NavigateTo { target: "/clients/9".into() })
///     .then_effects(|effects| assert_eq!(assertions::sent_actions(effects).len(), 1))
///     .then_outcomes(|events| assert!(matches!(events, [RouterAction::NavigationResolved { .. }])))
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    state: Option<S>,
    action: Option<A>,
    state_checks: Vec<StateCheck<S>>,
    effect_checks: Vec<EffectCheck<A>>,
    outcome_checks: Vec<OutcomeCheck<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Start a test for `reducer`.
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            state: None,
            action: None,
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
            outcome_checks: Vec::new(),
        }
    }

    /// Environment handed to the reducer.
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// State before the step.
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.state = Some(state);
        self
    }

    /// Action to reduce.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Check the state after the step.
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Check the returned effects before anything runs.
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Execute every `Run` thunk, in order and at any nesting, and check the
    /// actions they returned.
    ///
    /// Thunks touch the environment, so side effects (history calls and the
    /// like) are visible to the test after [`run`](Self::run).
    #[must_use]
    pub fn then_outcomes<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[A]) + 'static,
    {
        self.outcome_checks.push(Box::new(check));
        self
    }

    /// Reduce once and run every check.
    ///
    /// # Panics
    ///
    /// Panics if the state, action or environment is missing, or if a check
    /// fails.
    #[allow(clippy::expect_used)] // Test harness
    pub fn run(self) {
        let mut state = self.state.expect("given_state() was not called");
        let action = self.action.expect("when_action() was not called");
        let env = self.environment.expect("with_env() was not called");

        let effects = self.reducer.reduce(&mut state, action, &env);

        for check in self.state_checks {
            check(&state);
        }
        for check in self.effect_checks {
            check(&effects);
        }
        if !self.outcome_checks.is_empty() {
            let outcomes = assertions::run_thunks(effects.into_iter());
            for check in self.outcome_checks {
                check(&outcomes);
            }
        }
    }
}

/// Checks over effect descriptions.
pub mod assertions {
    use waypoint_core::effect::Effect;

    /// Every effect is a no-op.
    ///
    /// # Panics
    ///
    /// Panics otherwise.
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_noop),
            "expected no effects, got {effects:?}"
        );
    }

    /// Exactly `expected` top-level effects.
    ///
    /// # Panics
    ///
    /// Panics otherwise.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "unexpected number of effects");
    }

    /// At least one `Run` effect, at any nesting.
    ///
    /// # Panics
    ///
    /// Panics otherwise.
    pub fn assert_has_run_effect<A>(effects: &[Effect<A>]) {
        assert!(count_run_effects(effects) > 0, "expected a Run effect");
    }

    /// No `Run` effect at any nesting: the step never touches the environment.
    ///
    /// # Panics
    ///
    /// Panics otherwise.
    pub fn assert_no_run_effect<A>(effects: &[Effect<A>]) {
        let runs = count_run_effects(effects);
        assert_eq!(runs, 0, "expected no Run effects, found {runs}");
    }

    /// Actions of every `Send`, sequences flattened, in order.
    #[must_use]
    pub fn sent_actions<A>(effects: &[Effect<A>]) -> Vec<&A> {
        let mut actions = Vec::new();
        for effect in effects {
            match effect {
                Effect::Send(action) => actions.push(action),
                Effect::Sequential(inner) => actions.extend(sent_actions(inner)),
                Effect::None | Effect::Run(_) => {},
            }
        }
        actions
    }

    /// Execute `Run` thunks in order, sequences flattened, collecting what
    /// they return. `Send` and `None` are skipped.
    pub fn run_thunks<A>(effects: impl IntoIterator<Item = Effect<A>>) -> Vec<A> {
        let mut outcomes = Vec::new();
        for effect in effects {
            match effect {
                Effect::Run(thunk) => outcomes.extend(thunk()),
                Effect::Sequential(inner) => outcomes.extend(run_thunks(inner)),
                Effect::None | Effect::Send(_) => {},
            }
        }
        outcomes
    }

    fn count_run_effects<A>(effects: &[Effect<A>]) -> usize {
        effects
            .iter()
            .map(|effect| match effect {
                Effect::Run(_) => 1,
                Effect::Sequential(inner) => count_run_effects(inner),
                Effect::None | Effect::Send(_) => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::{Arc, Mutex};
    use waypoint_core::{run_effect, send_all, smallvec, SmallVec};

    /// A page stack that only knows a fixed set of paths.
    #[derive(Debug, Default)]
    struct Pages {
        current: Option<String>,
        pending: Option<String>,
        error: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum PageAction {
        Open(String),
        Started(String),
        Resolved(String),
        Rejected(String),
    }

    struct Site {
        known: Vec<&'static str>,
        visited: Arc<Mutex<Vec<String>>>,
    }

    fn site() -> Site {
        Site {
            known: vec!["/", "/clients"],
            visited: Arc::default(),
        }
    }

    struct PageReducer;

    impl Reducer for PageReducer {
        type State = Pages;
        type Action = PageAction;
        type Environment = Site;

        fn reduce(&self, state: &mut Pages, action: PageAction, env: &Site) -> SmallVec<[Effect<PageAction>; 4]> {
            match action {
                PageAction::Open(path) if env.known.contains(&path.as_str()) => {
                    let visited = Arc::clone(&env.visited);
                    smallvec![
                        Effect::Send(PageAction::Started(path.clone())),
                        run_effect! {
                            visited.lock().unwrap().push(path.clone());
                            Some(PageAction::Resolved(path))
                        }
                    ]
                },
                PageAction::Open(path) => smallvec![send_all![
                    PageAction::Started(path.clone()),
                    PageAction::Rejected(format!("unknown page: {path}")),
                ]],
                PageAction::Started(path) => {
                    state.pending = Some(path);
                    SmallVec::new()
                },
                PageAction::Resolved(path) => {
                    state.pending = None;
                    state.current = Some(path);
                    SmallVec::new()
                },
                PageAction::Rejected(message) => {
                    state.pending = None;
                    state.error = Some(message);
                    smallvec![Effect::None]
                },
            }
        }
    }

    #[test]
    fn test_known_page_starts_then_runs() {
        let env = site();
        let visited = Arc::clone(&env.visited);

        ReducerTest::new(PageReducer)
            .with_env(env)
            .given_state(Pages::default())
            .when_action(PageAction::Open("/clients".into()))
            .then_state(|state| assert!(state.pending.is_none()))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assertions::assert_has_run_effect(effects);
                assert_eq!(
                    assertions::sent_actions(effects),
                    vec![&PageAction::Started("/clients".into())]
                );
            })
            .then_outcomes(|outcomes| {
                assert_eq!(outcomes, [PageAction::Resolved("/clients".into())]);
            })
            .run();

        assert_eq!(*visited.lock().unwrap(), vec!["/clients".to_string()]);
    }

    #[test]
    fn test_thunks_stay_idle_without_outcome_checks() {
        let env = site();
        let visited = Arc::clone(&env.visited);

        ReducerTest::new(PageReducer)
            .with_env(env)
            .given_state(Pages::default())
            .when_action(PageAction::Open("/".into()))
            .then_effects(assertions::assert_has_run_effect)
            .run();

        assert!(visited.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_page_is_rejected_without_running() {
        ReducerTest::new(PageReducer)
            .with_env(site())
            .given_state(Pages::default())
            .when_action(PageAction::Open("/reports".into()))
            .then_effects(|effects| {
                assertions::assert_no_run_effect(effects);
                assert_eq!(
                    assertions::sent_actions(effects),
                    vec![
                        &PageAction::Started("/reports".into()),
                        &PageAction::Rejected("unknown page: /reports".into()),
                    ]
                );
            })
            .then_outcomes(|outcomes| assert!(outcomes.is_empty()))
            .run();
    }

    #[test]
    fn test_events_update_state_only() {
        ReducerTest::new(PageReducer)
            .with_env(site())
            .given_state(Pages {
                pending: Some("/clients".into()),
                ..Pages::default()
            })
            .when_action(PageAction::Rejected("blocked".into()))
            .then_state(|state| {
                assert_eq!(state.pending, None);
                assert_eq!(state.error.as_deref(), Some("blocked"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_run_thunks_flattens_sequences() {
        let effects = vec![
            Effect::Send(PageAction::Started("/".into())),
            Effect::chain(vec![
                Effect::run(|| Some(PageAction::Resolved("/".into()))),
                Effect::None,
                Effect::run(|| None),
                Effect::run(|| Some(PageAction::Resolved("/clients".into()))),
            ]),
        ];

        assert_eq!(
            assertions::run_thunks(effects),
            vec![PageAction::Resolved("/".into()), PageAction::Resolved("/clients".into())]
        );
    }
}
