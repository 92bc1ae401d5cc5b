use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Player,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: Option<i32>,
    pub avatar: Option<String>,
    pub role: Role,
    pub current_level: Option<i32>,
    pub total_score: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user about to be registered. Names are expected to be trimmed already.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub age: Option<i32>,
    pub role: Role,
}

impl NewUser {
    /// Players start on level 1 with no score; admins have neither.
    pub fn starting_progress(&self) -> (Option<i32>, Option<i64>) {
        match self.role {
            Role::Player => (Some(1), Some(0)),
            Role::Admin => (None, None),
        }
    }
}

/// The fields a user may change on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub avatar: Option<String>,
    pub current_level: Option<i32>,
}

impl UserUpdate {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.trim().to_string();
        }
        if let Some(age) = self.age {
            user.age = Some(age);
        }
        if let Some(avatar) = &self.avatar {
            user.avatar = Some(avatar.trim().to_string());
        }
        if let Some(level) = self.current_level {
            user.current_level = Some(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_progress_depends_on_role() {
        let mut user = NewUser {
            name: "Ana".into(),
            username: "ana".into(),
            password_hash: String::new(),
            age: None,
            role: Role::Player,
        };
        assert_eq!(user.starting_progress(), (Some(1), Some(0)));

        user.role = Role::Admin;
        assert_eq!(user.starting_progress(), (None, None));
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            name: "Ana".into(),
            username: "ana".into(),
            password_hash: "secret-hash".into(),
            age: None,
            avatar: None,
            role: Role::Player,
            current_level: Some(1),
            total_score: Some(0),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["totalScore"], 0);
        assert_eq!(json["role"], "player");
    }
}
