use async_trait::async_trait;
use posedash_common::GameplaySubmission;
use sqlx::types::Json;

use super::{
    pool::PgPool, DataError, Frame, Gameplay, Level, NewFrame, NewLevel, NewPosture, NewUser, Posture, Store,
    StoreKind, User, UserUpdate,
};

const USER_COLUMNS: &str =
    "id, name, username, password_hash, age, avatar, role, current_level, total_score, created_at, updated_at";
const GAMEPLAY_COLUMNS: &str = "id, player, blocks, score, created_at, updated_at";
const LEVEL_COLUMNS: &str =
    "id, name, theme, time_limit, maximum_score, number_of_movements, number_of_freezes, created_at, updated_at";
const FRAME_COLUMNS: &str = "id, difficulty_level, camera_x, camera_y, camera_z, created_at, updated_at";
const POSTURE_COLUMNS: &str = "id, name, alpha, beta, url, hands_on_one_side, created_at, updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Store for PgStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Postgres
    }

    async fn ping(&self) -> Result<(), DataError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, DataError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DataError> {
        let (current_level, total_score) = user.starting_progress();
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, username, password_hash, age, role, current_level, total_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(user.role)
        .bind(current_level)
        .bind(total_score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DataError::UserExists(user.username.clone())
            } else {
                e.into()
            }
        })
    }

    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<Option<User>, DataError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE(TRIM($2), name),
                age = COALESCE($3, age),
                avatar = COALESCE(TRIM($4), avatar),
                current_level = COALESCE($5, current_level),
                updated_at = NOW()
            WHERE username = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(update.name)
        .bind(update.age)
        .bind(update.avatar)
        .bind(update.current_level)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn top_users(&self, limit: i64) -> Result<Vec<User>, DataError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY total_score DESC NULLS LAST, username ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn save_gameplay(&self, player: &str, submission: GameplaySubmission) -> Result<Gameplay, DataError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE users SET total_score = COALESCE(total_score, 0) + $2, updated_at = NOW() WHERE username = $1",
        )
        .bind(player)
        .bind(submission.score)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(DataError::UserNotFound(player.to_string()));
        }

        let gameplay = sqlx::query_as::<_, Gameplay>(&format!(
            "INSERT INTO gameplays (player, blocks, score) VALUES ($1, $2, $3) RETURNING {GAMEPLAY_COLUMNS}"
        ))
        .bind(player)
        .bind(Json(&submission.blocks))
        .bind(submission.score)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(gameplay)
    }

    async fn find_gameplay(&self, id: i64) -> Result<Option<Gameplay>, DataError> {
        let gameplay = sqlx::query_as::<_, Gameplay>(&format!("SELECT {GAMEPLAY_COLUMNS} FROM gameplays WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(gameplay)
    }

    async fn gameplays_by_player(&self, username: &str) -> Result<Vec<Gameplay>, DataError> {
        let gameplays = sqlx::query_as::<_, Gameplay>(&format!(
            "SELECT {GAMEPLAY_COLUMNS} FROM gameplays WHERE player = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(gameplays)
    }

    async fn top_gameplays(&self, limit: i64) -> Result<Vec<Gameplay>, DataError> {
        let gameplays = sqlx::query_as::<_, Gameplay>(&format!(
            "SELECT {GAMEPLAY_COLUMNS} FROM gameplays ORDER BY score DESC, created_at ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(gameplays)
    }

    async fn levels(&self) -> Result<Vec<Level>, DataError> {
        let levels = sqlx::query_as::<_, Level>(&format!("SELECT {LEVEL_COLUMNS} FROM levels ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(levels)
    }

    async fn find_level(&self, id: i32) -> Result<Option<Level>, DataError> {
        let level = sqlx::query_as::<_, Level>(&format!("SELECT {LEVEL_COLUMNS} FROM levels WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(level)
    }

    async fn insert_level(&self, level: NewLevel) -> Result<Level, DataError> {
        let level = sqlx::query_as::<_, Level>(&format!(
            r#"
            INSERT INTO levels (id, name, theme, time_limit, maximum_score, number_of_movements, number_of_freezes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LEVEL_COLUMNS}
            "#
        ))
        .bind(level.id)
        .bind(level.name)
        .bind(level.theme)
        .bind(level.time_limit)
        .bind(level.maximum_score)
        .bind(level.number_of_movements)
        .bind(level.number_of_freezes)
        .fetch_one(&self.pool)
        .await?;
        Ok(level)
    }

    async fn frames(&self) -> Result<Vec<Frame>, DataError> {
        let frames = sqlx::query_as::<_, Frame>(&format!("SELECT {FRAME_COLUMNS} FROM frames ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(frames)
    }

    async fn find_frame(&self, id: i64) -> Result<Option<Frame>, DataError> {
        let frame = sqlx::query_as::<_, Frame>(&format!("SELECT {FRAME_COLUMNS} FROM frames WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(frame)
    }

    async fn frames_for_level(&self, level_id: i32) -> Result<Vec<Frame>, DataError> {
        let frames = sqlx::query_as::<_, Frame>(&format!(
            "SELECT {FRAME_COLUMNS} FROM frames WHERE $1 = ANY(difficulty_level) ORDER BY id"
        ))
        .bind(level_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(frames)
    }

    async fn insert_frame(&self, frame: NewFrame) -> Result<Frame, DataError> {
        let frame = sqlx::query_as::<_, Frame>(&format!(
            r#"
            INSERT INTO frames (difficulty_level, camera_x, camera_y, camera_z)
            VALUES ($1, $2, $3, $4)
            RETURNING {FRAME_COLUMNS}
            "#
        ))
        .bind(frame.difficulty_level)
        .bind(frame.coordinates.camera_x)
        .bind(frame.coordinates.camera_y)
        .bind(frame.coordinates.camera_z)
        .fetch_one(&self.pool)
        .await?;
        Ok(frame)
    }

    async fn postures(&self) -> Result<Vec<Posture>, DataError> {
        let postures = sqlx::query_as::<_, Posture>(&format!("SELECT {POSTURE_COLUMNS} FROM postures ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(postures)
    }

    async fn find_posture(&self, id: &str) -> Result<Option<Posture>, DataError> {
        let posture = sqlx::query_as::<_, Posture>(&format!("SELECT {POSTURE_COLUMNS} FROM postures WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(posture)
    }

    async fn insert_posture(&self, posture: NewPosture) -> Result<Posture, DataError> {
        let posture = sqlx::query_as::<_, Posture>(&format!(
            r#"
            INSERT INTO postures (id, name, alpha, beta, url, hands_on_one_side)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {POSTURE_COLUMNS}
            "#
        ))
        .bind(posture.id)
        .bind(posture.name)
        .bind(posture.alpha)
        .bind(posture.beta)
        .bind(posture.url)
        .bind(posture.hands_on_one_side)
        .fetch_one(&self.pool)
        .await?;
        Ok(posture)
    }
}
