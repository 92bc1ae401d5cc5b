//! Persistence behind the [`Store`] trait, with a Postgres and an in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use posedash_common::GameplaySubmission;
use tracing::info;

use crate::config::Config;

pub mod catalog;
pub mod gameplay;
pub mod memory;
pub mod pg;
pub mod pool;
pub mod seed;
pub mod user;

pub use catalog::{Coordinates, Frame, Level, NewFrame, NewLevel, NewPosture, Posture};
pub use gameplay::Gameplay;
pub use user::{NewUser, Role, User, UserUpdate};

#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("user {0} already exists")]
    UserExists(String),
    #[error("user {0} not found")]
    UserNotFound(String),
}

/// Which backend a [`Store`] talks to, reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::Memory => "memory",
        }
    }
}

/// Every query the routes need. Leaderboard `limit`s are already clamped by the caller.
#[automock]
#[async_trait]
pub trait Store: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), DataError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, DataError>;
    /// Fails with [`DataError::UserExists`] when the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, DataError>;
    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<Option<User>, DataError>;
    /// Users by total score, highest first, ties broken by username.
    async fn top_users(&self, limit: i64) -> Result<Vec<User>, DataError>;

    /// Saves the gameplay and adds its score to the player's total, atomically.
    async fn save_gameplay(&self, player: &str, submission: GameplaySubmission) -> Result<Gameplay, DataError>;
    async fn find_gameplay(&self, id: i64) -> Result<Option<Gameplay>, DataError>;
    /// Newest first.
    async fn gameplays_by_player(&self, username: &str) -> Result<Vec<Gameplay>, DataError>;
    async fn top_gameplays(&self, limit: i64) -> Result<Vec<Gameplay>, DataError>;

    async fn levels(&self) -> Result<Vec<Level>, DataError>;
    async fn find_level(&self, id: i32) -> Result<Option<Level>, DataError>;
    async fn insert_level(&self, level: NewLevel) -> Result<Level, DataError>;

    async fn frames(&self) -> Result<Vec<Frame>, DataError>;
    async fn find_frame(&self, id: i64) -> Result<Option<Frame>, DataError>;
    async fn frames_for_level(&self, level_id: i32) -> Result<Vec<Frame>, DataError>;
    async fn insert_frame(&self, frame: NewFrame) -> Result<Frame, DataError>;

    async fn postures(&self) -> Result<Vec<Posture>, DataError>;
    async fn find_posture(&self, id: &str) -> Result<Option<Posture>, DataError>;
    async fn insert_posture(&self, posture: NewPosture) -> Result<Posture, DataError>;
}

/// Opens the configured store, running migrations and seeding when asked to.
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>, DataError> {
    let store: Arc<dyn Store> = match &config.database {
        Some(database) => {
            let pool = pool::create_pool(&database.url, database.max_connections).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations applied");
            Arc::new(pg::PgStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, keeping everything in memory");
            Arc::new(memory::MemoryStore::default())
        }
    };

    if config.seed_defaults {
        seed::seed_defaults(store.as_ref()).await?;
    }
    Ok(store)
}
