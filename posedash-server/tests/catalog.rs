mod common;

use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::{test_context, TestContext};

#[tokio::test]
async fn test_levels() {
    let TestContext { server, .. } = test_context().call().await;

    let levels: Vec<Value> = server.get("/api/v1/levels").await.json();
    assert_eq!(levels.len(), 4);
    assert_eq!(levels[0]["name"], "Warm Up");
    assert_eq!(levels[0]["numberOfFreezes"], 4);

    let level: Value = server.get("/api/v1/levels/2").await.json();
    assert_eq!(level["theme"], "forest");

    for missing in ["99", "two"] {
        let response = server.get(&format!("/api/v1/levels/{missing}")).await;
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json::<Value>()["msg"], "Level with id not found");
    }
}

#[tokio::test]
async fn test_frames() {
    let TestContext { server, .. } = test_context().call().await;

    let frames: Vec<Value> = server.get("/api/v1/frames").await.json();
    assert_eq!(frames.len(), 5);

    let id = &frames[0]["id"];
    let frame: Value = server.get(&format!("/api/v1/frames/{id}")).await.json();
    assert_eq!(&frame, &frames[0]);
    assert!(frame["coordinates"]["cameraZ"].is_number());

    let response = server.get("/api/v1/frames/424242").await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<Value>()["msg"], "Frame with id not found");
}

#[tokio::test]
async fn test_frames_by_level() {
    let TestContext { server, .. } = test_context().call().await;

    let frames: Vec<Value> = server.get("/api/v1/frames/level/1").await.json();
    assert_eq!(frames.len(), 2);
    for frame in &frames {
        let levels = frame["difficultyLevel"].as_array().unwrap();
        assert!(levels.contains(&Value::from(1)), "{frame}");
    }

    for _ in 0..10 {
        let frame: Value = server.get("/api/v1/frames/level/4/random").await.json();
        let levels = frame["difficultyLevel"].as_array().unwrap();
        assert!(levels.contains(&Value::from(4)), "{frame}");
    }

    for path in ["/api/v1/frames/level/9", "/api/v1/frames/level/9/random"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), 404, "{path}");
        assert_eq!(response.json::<Value>()["msg"], "Level does not exist");
    }
}

#[tokio::test]
async fn test_postures() {
    let TestContext { server, .. } = test_context().call().await;

    let postures: Vec<Value> = server.get("/api/v1/postures").await.json();
    assert_eq!(postures.len(), 26);

    let posture: Value = server.get("/api/v1/postures/A").await.json();
    assert_eq!(posture["id"], "a");
    assert!(posture["alpha"].is_number());

    let response = server.get("/api/v1/postures/zz").await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<Value>()["msg"], "Posture with id not found");
}
