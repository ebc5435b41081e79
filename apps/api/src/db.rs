use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

/// Creates a PostgreSQL connection pool when a database URL is configured and
/// runs pending migrations. Any failure downgrades to "no persistence"
/// instead of aborting startup — the gateway reports itself unavailable.
pub async fn try_create_pool(database_url: Option<&str>) -> Option<PgPool> {
    let url = database_url?;
    info!("Connecting to PostgreSQL...");

    let pool = match PgPoolOptions::new().max_connections(10).connect(url).await {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Could not connect to PostgreSQL, persistence disabled: {e}");
            return None;
        }
    };

    if let Err(e) = sqlx::migrate!().run(&pool).await {
        warn!("Migrations failed, persistence disabled: {e}");
        return None;
    }

    info!("PostgreSQL connection pool established");
    Some(pool)
}
