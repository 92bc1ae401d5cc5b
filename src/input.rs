//! Keyboard bindings.
//!
//! Keys are named the way browsers report them (`"ArrowUp"`, `"t"`), so a frontend can forward
//! its key events untouched.

use std::collections::HashMap;

use bevy_ecs::{
    event::{EventReader, EventWriter},
    resource::Resource,
    system::{Res, ResMut},
};
use tracing::trace;

use crate::{
    events::{GameCommand, GameEvent},
    systems::{components::GlobalState, pose::Pose},
};

#[derive(Debug, Clone, Resource)]
pub struct Bindings {
    key_bindings: HashMap<String, GameCommand>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut key_bindings = HashMap::new();

        key_bindings.insert("ArrowUp".to_string(), GameCommand::Jump);
        key_bindings.insert(" ".to_string(), GameCommand::Jump);

        // Poses
        key_bindings.insert("t".to_string(), GameCommand::Pose(Pose::T));
        key_bindings.insert("i".to_string(), GameCommand::Pose(Pose::I));
        key_bindings.insert("j".to_string(), GameCommand::Pose(Pose::J));
        key_bindings.insert("n".to_string(), GameCommand::Pose(Pose::N));
        key_bindings.insert("p".to_string(), GameCommand::Pose(Pose::P));

        key_bindings.insert("Escape".to_string(), GameCommand::Exit);

        Self { key_bindings }
    }
}

impl Bindings {
    pub fn command_for(&self, key: &str) -> Option<GameCommand> {
        self.key_bindings.get(key).copied()
    }

    pub fn bind(&mut self, key: impl Into<String>, command: GameCommand) {
        self.key_bindings.insert(key.into(), command);
    }
}

/// Keys pressed since the last frame.
#[derive(Debug, Clone, Default, Resource)]
pub struct PendingKeys(pub Vec<String>);

/// Translates pressed keys into game events, dropping unbound keys.
pub fn process_keys(bindings: &Bindings, keys: &[String]) -> Vec<GameEvent> {
    keys.iter()
        .filter_map(|key| {
            let command = bindings.command_for(key);
            if command.is_none() {
                trace!(key, "Unbound key");
            }
            command.map(GameEvent::Command)
        })
        .collect()
}

pub fn input_system(bindings: Res<Bindings>, mut keys: ResMut<PendingKeys>, mut writer: EventWriter<GameEvent>) {
    if keys.0.is_empty() {
        return;
    }

    let events = process_keys(&bindings, &keys.0);
    keys.0.clear();
    writer.write_batch(events);
}

pub fn exit_system(mut events: EventReader<GameEvent>, mut state: ResMut<GlobalState>) {
    if events.read().any(|event| *event == GameEvent::Command(GameCommand::Exit)) {
        state.exit = true;
    }
}
