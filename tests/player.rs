use bevy_ecs::{entity::Entity, system::RunSystemOnce, world::World};
use posedash::{
    constants::{JUMP_VELOCITY, PLAYER_Z},
    events::{GameCommand, GameEvent, PhaseEvent},
    game::phase::{Phase, PhaseClock},
    systems::{
        animation_system, break_reset_system, freeze_player_system, jump_command_system, jump_physics_system,
        levitation_system, AnimationClip, Animator, ArmPose, BreakTimer, DeltaTime, JumpState, Levitation, Pose,
        PoseSamples, Position,
    },
};
use speculoos::prelude::*;

mod common;

fn jump(world: &mut World) {
    common::send_game_event(world, GameEvent::Command(GameCommand::Jump));
    world.run_system_once(jump_command_system).expect("System should run successfully");
}

fn height(world: &World, player: Entity) -> f32 {
    world.get::<Position>(player).unwrap().0.y
}

#[test]
fn test_jump_starts_from_the_ground() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);

    jump(&mut world);

    let state = *world.get::<JumpState>(player).unwrap();
    assert_that(&state.airborne).is_true();
    assert_that(&state.velocity).is_equal_to(JUMP_VELOCITY);
    assert_that(&world.get::<Animator>(player).unwrap().clip()).is_equal_to(AnimationClip::Jumping);
}

#[test]
fn test_jump_ignored_while_airborne() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    world.get_mut::<JumpState>(player).unwrap().airborne = true;
    world.get_mut::<JumpState>(player).unwrap().velocity = -3.0;

    jump(&mut world);

    assert_that(&world.get::<JumpState>(player).unwrap().velocity).is_equal_to(-3.0);
}

#[test]
fn test_jump_only_accepted_while_active() {
    for phase in [Phase::Preparation, Phase::Freezing, Phase::Break] {
        let mut world = common::create_test_world();
        let player = common::spawn_test_player(&mut world);
        common::enter_phase(&mut world, phase);

        jump(&mut world);

        assert_that(&world.get::<JumpState>(player).unwrap().airborne).is_false();
        assert_that(&world.get::<Animator>(player).unwrap().clip()).is_equal_to(AnimationClip::Running);
    }
}

#[test]
fn test_gravity_brings_the_player_back_down() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    jump(&mut world);

    let mut peak: f32 = 0.0;
    for _ in 0..120 {
        world.run_system_once(jump_physics_system).expect("System should run successfully");
        peak = peak.max(height(&world, player));
    }

    // v^2 / 2g = 3.6, give or take the frame step
    assert_that(&peak).is_close_to(3.6, 0.2);
    assert_that(&height(&world, player)).is_equal_to(0.0);
    assert_that(&world.get::<JumpState>(player).unwrap().airborne).is_false();
}

#[test]
fn test_jump_animation_returns_to_running() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    jump(&mut world);
    world.insert_resource(DeltaTime { seconds: 0.5 });

    world.run_system_once(animation_system).expect("System should run successfully");
    assert_that(&world.get::<Animator>(player).unwrap().clip()).is_equal_to(AnimationClip::Jumping);

    world.run_system_once(animation_system).expect("System should run successfully");
    assert_that(&world.get::<Animator>(player).unwrap().clip()).is_equal_to(AnimationClip::Running);
}

#[test]
fn test_standing_resumes_running_when_active() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    world.get_mut::<Animator>(player).unwrap().play(AnimationClip::Standing);

    common::enter_phase(&mut world, Phase::Freezing);
    world.run_system_once(animation_system).expect("System should run successfully");
    assert_that(&world.get::<Animator>(player).unwrap().clip()).is_equal_to(AnimationClip::Standing);

    common::enter_phase(&mut world, Phase::Active);
    world.run_system_once(animation_system).expect("System should run successfully");
    assert_that(&world.get::<Animator>(player).unwrap().clip()).is_equal_to(AnimationClip::Running);
}

#[test]
fn test_entering_freezing_stands_the_player() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    jump(&mut world);
    world.get_mut::<Position>(player).unwrap().0.y = 1.5;
    world.get_mut::<ArmPose>(player).unwrap().pose = Some(Pose::T);
    world.resource_mut::<PoseSamples>().push(40.0);

    common::send_phase_event(
        &mut world,
        PhaseEvent::Entered {
            from: Phase::Preparation,
            to: Phase::Freezing,
            block: 1,
        },
    );
    world.run_system_once(freeze_player_system).expect("System should run successfully");

    assert_that(&world.get::<Animator>(player).unwrap().clip()).is_equal_to(AnimationClip::Standing);
    assert_that(&world.get::<JumpState>(player).unwrap().airborne).is_false();
    assert_that(&height(&world, player)).is_equal_to(0.0);
    assert_that(&world.get::<ArmPose>(player).unwrap().pose).is_none();
    assert_that(&world.resource::<PoseSamples>().is_empty()).is_true();
}

#[test]
fn test_levitation_starts_three_seconds_before_freezing_ends() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    common::enter_phase(&mut world, Phase::Freezing);

    world.run_system_once(levitation_system).expect("System should run successfully");
    assert_that(&*world.get::<Levitation>(player).unwrap()).is_equal_to(Levitation::Idle);

    while world.resource::<PhaseClock>().remaining() > 3 {
        world.resource_mut::<PhaseClock>().tick();
    }
    world.run_system_once(levitation_system).expect("System should run successfully");
    assert_that(&world.get::<Levitation>(player).unwrap().is_levitating()).is_true();

    world.insert_resource(DeltaTime { seconds: 0.9 });
    world.run_system_once(levitation_system).expect("System should run successfully");
    assert_that(&height(&world, player)).is_close_to(1.2, 0.001);

    world.insert_resource(DeltaTime { seconds: 2.5 });
    world.run_system_once(levitation_system).expect("System should run successfully");
    assert_that(&*world.get::<Levitation>(player).unwrap()).is_equal_to(Levitation::Finished);
    assert_that(&height(&world, player)).is_equal_to(0.0);
    assert_that(&world.get::<Position>(player).unwrap().0.z).is_less_than(PLAYER_Z);
}

#[test]
fn test_break_resets_the_track_once() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    common::spawn_test_obstacle(&mut world, 10.0);
    world.get_mut::<Position>(player).unwrap().0.z = PLAYER_Z - 20.0;
    common::enter_phase(&mut world, Phase::Break);
    common::send_phase_event(
        &mut world,
        PhaseEvent::Entered {
            from: Phase::Freezing,
            to: Phase::Break,
            block: 1,
        },
    );

    world.insert_resource(DeltaTime { seconds: 10.0 });
    world.run_system_once(break_reset_system).expect("System should run successfully");
    assert_that(&world.get::<Position>(player).unwrap().0.z).is_equal_to(PLAYER_Z - 20.0);

    world.resource_mut::<bevy_ecs::event::Events<PhaseEvent>>().clear();
    world.run_system_once(break_reset_system).expect("System should run successfully");

    assert_that(&world.get::<Position>(player).unwrap().0.z).is_equal_to(PLAYER_Z);
    assert_that(&world.resource::<BreakTimer>().reset_done).is_true();
    let mut obstacles = world.query::<&posedash::systems::Obstacle>();
    assert_that(&obstacles.iter(&world).count()).is_equal_to(0);
}
