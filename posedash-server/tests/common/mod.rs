#![allow(dead_code)]

use std::sync::Arc;

use axum_test::{TestResponse, TestServer};
use bon::builder;
use cookie::Cookie;
use posedash_common::{BlockResult, GameplaySubmission};
use posedash_server::{
    app::{create_router, AppState},
    config::{self, Config},
    data::{self, Store},
};
use serde_json::json;
#[cfg(feature = "postgres-tests")]
use posedash_server::config::DatabaseConfig;
#[cfg(feature = "postgres-tests")]
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

pub const PASSWORD: &str = "correct horse";

/// A server wired to either the in-memory store or a throwaway Postgres container.
pub struct TestContext {
    pub config: Config,
    pub server: TestServer,
    pub app_state: AppState,
    #[cfg(feature = "postgres-tests")]
    pub container: Option<ContainerAsync<GenericImage>>,
}

#[builder]
pub async fn test_context(#[builder(default)] use_database: bool, store: Option<Arc<dyn Store>>) -> TestContext {
    let config = config::test_config();

    #[cfg(feature = "postgres-tests")]
    let (config, container) = if use_database {
        let (url, container) = setup_test_database("testdb", "testuser", "testpass").await;
        let database = Some(DatabaseConfig { url, max_connections: 5 });
        (Config { database, ..config }, Some(container))
    } else {
        (config, None)
    };
    #[cfg(not(feature = "postgres-tests"))]
    assert!(!use_database, "database tests need the postgres-tests feature");

    let store = match store {
        Some(store) => store,
        None => data::connect(&config).await.expect("Failed to open the store"),
    };

    let app_state = AppState::new(config.clone(), store);
    let server = TestServer::new(create_router(app_state.clone())).expect("Failed to start test server");

    TestContext {
        config,
        server,
        app_state,
        #[cfg(feature = "postgres-tests")]
        container,
    }
}

/// Set up a test PostgreSQL database using testcontainers
#[cfg(feature = "postgres-tests")]
async fn setup_test_database(db: &str, user: &str, password: &str) -> (String, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "15")
        .with_exposed_port(5432.tcp())
        .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"))
        .with_env_var("POSTGRES_DB", db)
        .with_env_var("POSTGRES_USER", user)
        .with_env_var("POSTGRES_PASSWORD", password)
        .start()
        .await
        .unwrap();

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();

    (
        format!("postgresql://{user}:{password}@{host}:{port}/{db}?sslmode=disable"),
        container,
    )
}

/// Registers a player and returns the session cookie from the response.
pub async fn register(server: &TestServer, username: &str) -> Cookie<'static> {
    let response = server
        .post("/api/v1/users/register")
        .json(&json!({
            "username": username,
            "name": format!("{username} Tester"),
            "password": PASSWORD,
            "age": 21,
        }))
        .await;
    assert_eq!(response.status_code(), 201, "register {username}: {}", response.text());
    response.cookie("token")
}

pub async fn login(server: &TestServer, username: &str, password: &str) -> TestResponse {
    server
        .post("/api/v1/users/login")
        .json(&json!({ "username": username, "password": password }))
        .await
}

pub fn block(block_id: u8, jumps_succeeded: u32, jumps_failed: u32, average_pose_accuracy: f32) -> BlockResult {
    BlockResult {
        block_id,
        jumps_succeeded,
        jumps_failed,
        average_pose_accuracy,
    }
}

/// Posts a gameplay whose score is derived from `blocks`.
pub async fn submit(server: &TestServer, token: &Cookie<'static>, blocks: Vec<BlockResult>) -> TestResponse {
    server
        .post("/api/v1/gameplays")
        .add_cookie(token.clone())
        .json(&GameplaySubmission::from_blocks(blocks))
        .await
}
