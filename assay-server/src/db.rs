use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create results table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            id UUID PRIMARY KEY,
            test_id VARCHAR(255) NOT NULL,
            owner UUID NOT NULL,
            state VARCHAR(20) NOT NULL,
            created TIMESTAMPTZ NOT NULL,
            processed TIMESTAMPTZ,
            directory TEXT NOT NULL,
            input_file VARCHAR(255) NOT NULL,
            output_file VARCHAR(255) NOT NULL,
            data JSONB
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_results_test_id ON results(test_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_results_owner ON results(owner)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
