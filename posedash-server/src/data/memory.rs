use std::{
    cmp::Reverse,
    sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use posedash_common::GameplaySubmission;

use super::{
    DataError, Frame, Gameplay, Level, NewFrame, NewLevel, NewPosture, NewUser, Posture, Store, StoreKind, User,
    UserUpdate,
};

/// Keeps everything in process memory. Used when no database is configured, and by the tests.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    gameplays: DashMap<i64, Gameplay>,
    levels: DashMap<i32, Level>,
    frames: DashMap<i64, Frame>,
    postures: DashMap<String, Posture>,
    next_id: AtomicI64,
}

impl MemoryStore {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn sorted_by_key<T: Clone, K: Ord>(values: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut values: Vec<T> = values.collect();
    values.sort_by_key(key);
    values
}

#[async_trait]
impl Store for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn ping(&self) -> Result<(), DataError> {
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, DataError> {
        Ok(self.users.get(username).map(|user| user.value().clone()))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DataError> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(DataError::UserExists(user.username)),
            Entry::Vacant(slot) => {
                let (current_level, total_score) = user.starting_progress();
                let now = Utc::now();
                let created = User {
                    id: self.next_id(),
                    name: user.name,
                    username: user.username,
                    password_hash: user.password_hash,
                    age: user.age,
                    avatar: None,
                    role: user.role,
                    current_level,
                    total_score,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<Option<User>, DataError> {
        Ok(self.users.get_mut(username).map(|mut user| {
            update.apply(&mut user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn top_users(&self, limit: i64) -> Result<Vec<User>, DataError> {
        let mut users = sorted_by_key(self.users.iter().map(|u| u.value().clone()), |u| {
            (Reverse(u.total_score), u.username.clone())
        });
        users.truncate(limit.max(0) as usize);
        Ok(users)
    }

    async fn save_gameplay(&self, player: &str, submission: GameplaySubmission) -> Result<Gameplay, DataError> {
        let mut user = self
            .users
            .get_mut(player)
            .ok_or_else(|| DataError::UserNotFound(player.to_string()))?;

        let now = Utc::now();
        let gameplay = Gameplay {
            id: self.next_id(),
            player: player.to_string(),
            blocks: submission.blocks,
            score: submission.score,
            created_at: now,
            updated_at: now,
        };
        self.gameplays.insert(gameplay.id, gameplay.clone());

        user.total_score = Some(user.total_score.unwrap_or(0) + gameplay.score);
        user.updated_at = now;
        Ok(gameplay)
    }

    async fn find_gameplay(&self, id: i64) -> Result<Option<Gameplay>, DataError> {
        Ok(self.gameplays.get(&id).map(|g| g.value().clone()))
    }

    async fn gameplays_by_player(&self, username: &str) -> Result<Vec<Gameplay>, DataError> {
        let own = self.gameplays.iter().filter(|g| g.player == username).map(|g| g.value().clone());
        Ok(sorted_by_key(own, |g| Reverse((g.created_at, g.id))))
    }

    async fn top_gameplays(&self, limit: i64) -> Result<Vec<Gameplay>, DataError> {
        let mut gameplays = sorted_by_key(self.gameplays.iter().map(|g| g.value().clone()), |g| {
            (Reverse(g.score), g.created_at, g.id)
        });
        gameplays.truncate(limit.max(0) as usize);
        Ok(gameplays)
    }

    async fn levels(&self) -> Result<Vec<Level>, DataError> {
        Ok(sorted_by_key(self.levels.iter().map(|l| l.value().clone()), |l| l.id))
    }

    async fn find_level(&self, id: i32) -> Result<Option<Level>, DataError> {
        Ok(self.levels.get(&id).map(|l| l.value().clone()))
    }

    async fn insert_level(&self, level: NewLevel) -> Result<Level, DataError> {
        let now = Utc::now();
        let level = Level {
            id: level.id,
            name: level.name,
            theme: level.theme,
            time_limit: level.time_limit,
            maximum_score: level.maximum_score,
            number_of_movements: level.number_of_movements,
            number_of_freezes: level.number_of_freezes,
            created_at: now,
            updated_at: now,
        };
        self.levels.insert(level.id, level.clone());
        Ok(level)
    }

    async fn frames(&self) -> Result<Vec<Frame>, DataError> {
        Ok(sorted_by_key(self.frames.iter().map(|f| f.value().clone()), |f| f.id))
    }

    async fn find_frame(&self, id: i64) -> Result<Option<Frame>, DataError> {
        Ok(self.frames.get(&id).map(|f| f.value().clone()))
    }

    async fn frames_for_level(&self, level_id: i32) -> Result<Vec<Frame>, DataError> {
        let matching = self.frames.iter().filter(|f| f.belongs_to(level_id)).map(|f| f.value().clone());
        Ok(sorted_by_key(matching, |f| f.id))
    }

    async fn insert_frame(&self, frame: NewFrame) -> Result<Frame, DataError> {
        let now = Utc::now();
        let frame = Frame {
            id: self.next_id(),
            difficulty_level: frame.difficulty_level,
            coordinates: frame.coordinates,
            created_at: now,
            updated_at: now,
        };
        self.frames.insert(frame.id, frame.clone());
        Ok(frame)
    }

    async fn postures(&self) -> Result<Vec<Posture>, DataError> {
        Ok(sorted_by_key(self.postures.iter().map(|p| p.value().clone()), |p| p.id.clone()))
    }

    async fn find_posture(&self, id: &str) -> Result<Option<Posture>, DataError> {
        Ok(self.postures.get(id).map(|p| p.value().clone()))
    }

    async fn insert_posture(&self, posture: NewPosture) -> Result<Posture, DataError> {
        let now = Utc::now();
        let posture = Posture {
            id: posture.id,
            name: posture.name,
            alpha: posture.alpha,
            beta: posture.beta,
            url: posture.url,
            hands_on_one_side: posture.hands_on_one_side,
            created_at: now,
            updated_at: now,
        };
        self.postures.insert(posture.id.clone(), posture.clone());
        Ok(posture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Role;
    use posedash_common::BlockResult;

    fn player(username: &str) -> NewUser {
        NewUser {
            name: username.to_uppercase(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            age: None,
            role: Role::Player,
        }
    }

    #[tokio::test]
    async fn test_duplicate_usernames_are_rejected() {
        let store = MemoryStore::default();
        store.create_user(player("ana")).await.unwrap();

        let err = store.create_user(player("ana")).await.unwrap_err();
        assert!(matches!(err, DataError::UserExists(name) if name == "ana"));
    }

    #[tokio::test]
    async fn test_saving_a_gameplay_adds_to_total_score() {
        let store = MemoryStore::default();
        store.create_user(player("ana")).await.unwrap();
        let submission = GameplaySubmission {
            blocks: vec![BlockResult {
                block_id: 1,
                jumps_succeeded: 3,
                jumps_failed: 1,
                average_pose_accuracy: 85.0,
            }],
            score: 100,
        };

        let gameplay = store.save_gameplay("ana", submission).await.unwrap();

        assert_eq!(gameplay.score, 100);
        let user = store.find_user("ana").await.unwrap().unwrap();
        assert_eq!(user.total_score, Some(100));
    }

    #[tokio::test]
    async fn test_saving_for_an_unknown_player_fails() {
        let store = MemoryStore::default();
        let submission = GameplaySubmission { blocks: vec![], score: 0 };

        let err = store.save_gameplay("ghost", submission).await.unwrap_err();
        assert!(matches!(err, DataError::UserNotFound(_)));
        assert!(store.top_gameplays(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admins_sort_after_players() {
        let store = MemoryStore::default();
        let mut admin = player("root");
        admin.role = Role::Admin;
        store.create_user(admin).await.unwrap();
        store.create_user(player("bob")).await.unwrap();
        store.create_user(player("ana")).await.unwrap();

        let names: Vec<_> = store.top_users(10).await.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, ["ana", "bob", "root"]);
    }
}
