pub mod frames;
pub mod gameplays;
pub mod health;
pub mod levels;
pub mod postures;
pub mod users;

use serde::Deserialize;

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// `?limit=` is kept as text so a malformed value falls back to the default instead of failing.
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<String>,
}

impl LeaderboardQuery {
    pub fn limit(&self) -> i64 {
        match self.limit.as_deref().map(str::trim).map(str::parse::<i64>) {
            Some(Ok(limit)) if limit > 0 => limit.min(MAX_LEADERBOARD_LIMIT),
            _ => DEFAULT_LEADERBOARD_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(raw: Option<&str>) -> i64 {
        LeaderboardQuery {
            limit: raw.map(str::to_string),
        }
        .limit()
    }

    #[test]
    fn test_leaderboard_limit() {
        assert_eq!(limit(None), 10);
        assert_eq!(limit(Some("3")), 3);
        assert_eq!(limit(Some("abc")), 10);
        assert_eq!(limit(Some("0")), 10);
        assert_eq!(limit(Some("-5")), 10);
        assert_eq!(limit(Some("100000")), 100);
    }
}
