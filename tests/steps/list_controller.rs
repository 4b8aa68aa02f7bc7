//! Step definitions for the reservation list controller
//!
//! This module contains step definitions for:
//! - Scripting server replies
//! - Driving the controller lifecycle
//! - Broadcasting list modification events
//! - Verifying list state, alerts and issued queries

use crate::common::world::{parse_ids, ListWorld};
use cucumber::{given, then, when};
use tracing::info;
use weblioteca::client::services::AlertSeverity;
use weblioteca::{EventKind, ListState};

// === SERVER REPLIES ===

#[given(regex = r#"^the signed-in account is "([^"]+)"$"#)]
async fn given_account(world: &mut ListWorld, login: String) {
    world.reply_with_account(&login);
}

#[given(regex = r#"^the server lists reservas with ids "([^"]*)"$"#)]
async fn given_reservas(world: &mut ListWorld, ids: String) {
    world.reply_with_reservas(&parse_ids(&ids));
}

#[given(regex = r#"^the server fails reserva queries with "([^"]+)"$"#)]
async fn given_failing_queries(world: &mut ListWorld, message: String) {
    world.fail_reserva_queries(&message);
}

// === LIFECYCLE ===

#[given("the reserva list is initialized")]
async fn given_initialized(world: &mut ListWorld) {
    init_list(world).await;
}

#[when("the reserva list is initialized")]
async fn when_initialized(world: &mut ListWorld) {
    init_list(world).await;
}

async fn init_list(world: &mut ListWorld) {
    info!("Initializing reserva list");
    world.controller().init();
    world.settle().await;
}

#[when("the reserva list reloads")]
async fn reload_list(world: &mut ListWorld) {
    world.controller().load_all();
    world.settle().await;
}

#[when("the reserva list is destroyed")]
async fn destroy_list(world: &mut ListWorld) {
    world.controller().destroy();
}

// === EVENTS ===

#[when("a reserva list modification is broadcast")]
async fn broadcast_reserva(world: &mut ListWorld) {
    world.broadcast(EventKind::ReservaListModification);
    world.settle().await;
}

#[when(regex = r"^a reserva list modification is broadcast (\d+) times$")]
async fn broadcast_reserva_repeatedly(world: &mut ListWorld, times: usize) {
    for _ in 0..times {
        world.broadcast(EventKind::ReservaListModification);
    }
    world.settle().await;
}

#[when("an emprestimo list modification is broadcast")]
async fn broadcast_emprestimo(world: &mut ListWorld) {
    world.broadcast(EventKind::EmprestimoListModification);
    world.settle().await;
}

// === VERIFICATION ===

#[then(regex = r#"^the list state is "(uninitialized|loading|loaded|error)"$"#)]
async fn then_state(world: &mut ListWorld, state: String) {
    let expected = match state.as_str() {
        "uninitialized" => ListState::Uninitialized,
        "loading" => ListState::Loading,
        "loaded" => ListState::Loaded,
        _ => ListState::Error,
    };
    assert_eq!(world.controller().state(), expected);
}

#[then(regex = r#"^the displayed reservas have ids "([^"]*)"$"#)]
async fn then_ids(world: &mut ListWorld, ids: String) {
    let shown: Vec<i64> = world
        .controller()
        .items()
        .iter()
        .filter_map(|reserva| reserva.id)
        .collect();
    assert_eq!(shown, parse_ids(&ids));
}

#[then(regex = r#"^the current account is "([^"]+)"$"#)]
async fn then_account(world: &mut ListWorld, login: String) {
    let account = world.controller().current_account().cloned();
    assert_eq!(account.map(|a| a.login), Some(login));
}

#[then("no alert was raised")]
async fn then_no_alert(world: &mut ListWorld) {
    assert!(world.alerts.alerts().is_empty(), "{:?}", world.alerts.alerts());
}

#[then(regex = r#"^an error alert says "([^"]+)"$"#)]
async fn then_error_alert(world: &mut ListWorld, message: String) {
    let alerts = world.alerts.alerts();
    assert!(
        alerts
            .iter()
            .any(|a| a.severity == AlertSeverity::Error && a.message == message),
        "no error alert '{}' in {:?}",
        message,
        alerts
    );
}

#[then(regex = r"^exactly (\d+) reserva quer(?:y was|ies were) issued$")]
async fn then_query_count(world: &mut ListWorld, count: usize) {
    assert_eq!(world.reserva_query_count(), count);
}

#[then(regex = r"^exactly (\d+) list subscribers? (?:is|are) registered$")]
async fn then_subscriber_count(world: &mut ListWorld, count: usize) {
    assert_eq!(
        world.events.subscriber_count(EventKind::ReservaListModification),
        count
    );
}
