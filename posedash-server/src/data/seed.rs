//! The default catalogue inserted into an empty store.

use posedash_common::SEMAPHORE_POSTURES;
use tracing::info;

use super::{Coordinates, DataError, NewFrame, NewLevel, NewPosture, Store};

fn default_levels() -> Vec<NewLevel> {
    [
        (1, "Warm Up", "meadow", 600, 200, 40, 4),
        (2, "Steady Pace", "forest", 720, 200, 60, 6),
        (3, "Quick Feet", "desert", 840, 200, 80, 8),
        (4, "Statue Garden", "night", 920, 200, 100, 10),
    ]
    .into_iter()
    .map(|(id, name, theme, time_limit, maximum_score, movements, freezes)| NewLevel {
        id,
        name: name.to_string(),
        theme: theme.to_string(),
        time_limit,
        maximum_score,
        number_of_movements: movements,
        number_of_freezes: freezes,
    })
    .collect()
}

fn default_frames() -> Vec<NewFrame> {
    [
        (vec![1, 2], (0.0, 4.0, 90.0)),
        (vec![1], (-6.0, 5.0, 85.0)),
        (vec![2, 3], (6.0, 5.0, 85.0)),
        (vec![3, 4], (0.0, 8.0, 100.0)),
        (vec![4], (-10.0, 6.0, 80.0)),
    ]
    .into_iter()
    .map(|(difficulty_level, (camera_x, camera_y, camera_z))| NewFrame {
        difficulty_level,
        coordinates: Coordinates {
            camera_x,
            camera_y,
            camera_z,
        },
    })
    .collect()
}

/// Fills the levels, frames and postures collections that are still empty.
pub async fn seed_defaults(store: &dyn Store) -> Result<(), DataError> {
    if store.levels().await?.is_empty() {
        for level in default_levels() {
            store.insert_level(level).await?;
        }
        info!("Seeded default levels");
    }

    if store.frames().await?.is_empty() {
        for frame in default_frames() {
            store.insert_frame(frame).await?;
        }
        info!("Seeded default frames");
    }

    if store.postures().await?.is_empty() {
        for posture in SEMAPHORE_POSTURES.iter() {
            store.insert_posture(NewPosture::from(posture)).await?;
        }
        info!(count = SEMAPHORE_POSTURES.len(), "Seeded semaphore postures");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let store = MemoryStore::default();

        seed_defaults(&store).await.unwrap();
        seed_defaults(&store).await.unwrap();

        assert_eq!(store.levels().await.unwrap().len(), 4);
        assert_eq!(store.frames().await.unwrap().len(), 5);
        assert_eq!(store.postures().await.unwrap().len(), SEMAPHORE_POSTURES.len());
    }

    #[test]
    fn test_every_level_has_a_frame() {
        let frames = default_frames();
        for level in default_levels() {
            assert!(
                frames.iter().any(|f| f.difficulty_level.contains(&level.id)),
                "level {} has no frame",
                level.id
            );
        }
    }
}
