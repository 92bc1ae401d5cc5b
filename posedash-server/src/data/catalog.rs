//! Read-mostly collections: levels, camera frames and posture templates.

use chrono::{DateTime, Utc};
use posedash_common::SemaphorePosture;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: i32,
    pub name: String,
    pub theme: String,
    pub time_limit: i32,
    pub maximum_score: i32,
    pub number_of_movements: i32,
    pub number_of_freezes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLevel {
    pub id: i32,
    pub name: String,
    pub theme: String,
    pub time_limit: i32,
    pub maximum_score: i32,
    pub number_of_movements: i32,
    pub number_of_freezes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub camera_x: f64,
    pub camera_y: f64,
    pub camera_z: f64,
}

/// A camera placement used by the levels listed in `difficulty_level`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: i64,
    pub difficulty_level: Vec<i32>,
    #[sqlx(flatten)]
    pub coordinates: Coordinates,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Frame {
    pub fn belongs_to(&self, level_id: i32) -> bool {
        self.difficulty_level.contains(&level_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFrame {
    pub difficulty_level: Vec<i32>,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Posture {
    pub id: String,
    pub name: String,
    pub alpha: f64,
    pub beta: f64,
    pub url: Option<String>,
    pub hands_on_one_side: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPosture {
    pub id: String,
    pub name: String,
    pub alpha: f64,
    pub beta: f64,
    pub url: Option<String>,
    pub hands_on_one_side: bool,
}

impl From<&SemaphorePosture> for NewPosture {
    fn from(posture: &SemaphorePosture) -> Self {
        Self {
            id: posture.id.to_lowercase(),
            name: posture.id.to_string(),
            alpha: posture.angles.alpha as f64,
            beta: posture.angles.beta as f64,
            url: None,
            hands_on_one_side: posture.hands_on_one_side,
        }
    }
}
