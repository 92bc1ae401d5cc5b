use chrono::{DateTime, Utc};
use posedash_common::BlockResult;
use serde::Serialize;
use sqlx::FromRow;

/// A finished session, owned by the player who submitted it. Never updated once saved.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Gameplay {
    pub id: i64,
    pub player: String,
    #[sqlx(json)]
    pub blocks: Vec<BlockResult>,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
