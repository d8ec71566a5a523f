//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when a reducer describes work the store
//! should perform against the environment.

/// Create an `Effect::Run` from a block
///
/// The block is moved into a closure and must evaluate to `Option<Action>`.
///
/// # Example
///
/// ```rust,ignore
/// use waypoint_core::run_effect;
///
/// let navigation = env.navigation.clone();
/// run_effect! {
///     navigation.go_back().ok()?;
///     Some(RouterAction::PopState)
/// }
/// ```
#[macro_export]
macro_rules! run_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Run(
            ::std::boxed::Box::new(move || { $($body)* })
        )
    };
}

/// Create an `Effect::Sequential` that dispatches each action in order
///
/// # Example
///
/// ```rust,ignore
/// use waypoint_core::send_all;
///
/// send_all![
///     RouterAction::NavigationStarted { route: candidate },
///     RouterAction::NavigationRejected { .. },
/// ]
/// ```
#[macro_export]
macro_rules! send_all {
    ($($action:expr),* $(,)?) => {
        $crate::effect::Effect::Sequential(
            ::std::vec![$($crate::effect::Effect::Send($action)),*]
        )
    };
}
