use bevy_ecs::system::RunSystemOnce;
use posedash::{
    events::{GameCommand, GameEvent},
    input::{exit_system, input_system, process_keys, Bindings, PendingKeys},
    systems::{GlobalState, Pose},
};
use speculoos::prelude::*;

mod common;

fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

#[test]
fn test_default_bindings() {
    let bindings = Bindings::default();

    assert_that(&bindings.command_for("ArrowUp")).is_equal_to(Some(GameCommand::Jump));
    assert_that(&bindings.command_for(" ")).is_equal_to(Some(GameCommand::Jump));
    assert_that(&bindings.command_for("Escape")).is_equal_to(Some(GameCommand::Exit));
    assert_that(&bindings.command_for("p")).is_equal_to(Some(GameCommand::Pose(Pose::P)));
    // Keys are matched exactly
    assert_that(&bindings.command_for("T")).is_none();
}

#[test]
fn test_process_keys_drops_unbound_keys() {
    let events = process_keys(&Bindings::default(), &keys(&["ArrowUp", "x", "t"]));

    assert_that(&events).is_equal_to(vec![
        GameEvent::Command(GameCommand::Jump),
        GameEvent::Command(GameCommand::Pose(Pose::T)),
    ]);
}

#[test]
fn test_rebinding_a_key() {
    let mut bindings = Bindings::default();
    bindings.bind("w", GameCommand::Jump);
    bindings.bind("t", GameCommand::Pose(Pose::I));

    let events = process_keys(&bindings, &keys(&["w", "t"]));

    assert_that(&events).is_equal_to(vec![
        GameEvent::Command(GameCommand::Jump),
        GameEvent::Command(GameCommand::Pose(Pose::I)),
    ]);
}

#[test]
fn test_input_system_consumes_pending_keys() {
    let mut world = common::create_test_world();
    world.insert_resource(Bindings::default());
    world.insert_resource(PendingKeys(keys(&["j", "Escape"])));

    world.run_system_once(input_system).expect("System should run successfully");

    assert_that(&world.resource::<PendingKeys>().0).is_empty();
    assert_that(&common::game_events(&world)).is_equal_to(vec![
        GameEvent::Command(GameCommand::Pose(Pose::J)),
        GameEvent::Command(GameCommand::Exit),
    ]);

    world.run_system_once(exit_system).expect("System should run successfully");
    assert_that(&world.resource::<GlobalState>().exit).is_true();
}

#[test]
fn test_exit_system_ignores_other_commands() {
    let mut world = common::create_test_world();
    common::send_game_event(&mut world, GameEvent::Command(GameCommand::Jump));

    world.run_system_once(exit_system).expect("System should run successfully");

    assert_that(&world.resource::<GlobalState>().exit).is_false();
}
