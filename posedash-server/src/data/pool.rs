use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::{info, warn};

pub type PgPool = Pool<Postgres>;

/// Connects to Postgres, failing fast when the database is unreachable.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    info!(url = %redact_url(database_url), max_connections, "Connecting to PostgreSQL");

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .inspect_err(|e| warn!(error = %e, "Failed to connect to PostgreSQL"))
}

/// Hides the password of a connection URL.
fn redact_url(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    let Some(at) = url.rfind('@') else {
        return url.to_string();
    };
    match url[scheme_end..at].find(':') {
        Some(colon) => format!("{}:***{}", &url[..scheme_end + colon], &url[at..]),
        None => url.to_string(),
    }
}
