//! Client Management demo binary
//!
//! Drives the router over an in-memory history through a scripted session:
//! a deep link while signed out, sign-in, guarded navigation, query updates
//! and browser traversal.

use client_routes::{client_routes, navigate_guarded, post_login_target, Role, User};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypoint_router::mocks::MemoryHistory;
use waypoint_router::{params, RouteTarget, Router, RouterConfig, RouterError};

fn main() -> Result<(), RouterError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "client_routes=info,waypoint_router=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Client Management: routing over an in-memory history ===\n");

    // A deep link opened in a fresh tab
    let history = MemoryHistory::new("http://localhost:3000/clients/42/cars/7?action=edit&utm_source=mail");
    let router: Router<_, User> = Router::new(Arc::new(history.clone()), RouterConfig::default())?;
    router.listen();
    router.initialize(client_routes()?);
    report(&router, "initialize");

    // Signed out: the guarded helper sends us to the login page
    navigate_guarded(&router, "/clients/42", None);
    report(&router, "navigate to /clients/42 while signed out");

    // Sign in and land where we were going
    let staff = User::new("sam", [Role::Staff]);
    let target = post_login_target(&router);
    navigate_guarded(&router, target, Some(&staff));
    report(&router, "sign in as staff");

    // Staff may not open the admin area
    let denied = navigate_guarded(&router, "/admin", Some(&staff));
    println!("  /admin for staff: allowed={} reason={:?}", denied.allowed, denied.reason);

    // Structured navigation and query updates
    navigate_guarded(
        &router,
        RouteTarget::template("/clients/:id/cars/:carId")
            .with_route_param("id", "42")
            .with_route_param("carId", "7")
            .with_query_param("modal", "history"),
        Some(&staff),
    );
    report(&router, "open car 7 history modal");

    router.update_params(params([("action", "edit")]));
    report(&router, "update params");

    // Undeclared routes fail without touching history
    router.navigate_to("/reports");
    report(&router, "navigate to /reports");

    // The user presses back twice, then forward
    history.user_back();
    report(&router, "browser back");
    history.user_back();
    report(&router, "browser back");
    router.navigate_forward();
    report(&router, "navigate forward");

    println!("\nHistory entries:");
    for (index, entry) in history.entries().iter().enumerate() {
        let marker = if index == history.cursor() { ">" } else { " " };
        println!("  {marker} {entry}");
    }

    Ok(())
}

fn report(router: &Router<MemoryHistory, User>, step: &str) {
    let status = router.status();
    println!("\n>>> {step}");
    println!("  status: {}", status.name());
    if let Some(route) = status.current_route() {
        println!("  route:  {} ({})", route.template, route.path);
        if let Some(route_params) = &route.route_params {
            println!("  params: {route_params:?}");
        }
        if let Some(query_params) = &route.query_params {
            println!("  query:  {query_params:?}");
        }
    }
    if let Some((message, kind)) = router.with_state(|state| state.error().map(|(m, k)| (m.to_string(), k))) {
        println!("  error:  {message} [{kind}]");
    }
}
