use tracing_subscriber::EnvFilter;

use lang_portal_backend::config::Config;
use lang_portal_backend::db;

/// One-shot provisioning: create the schema, then load the seed data.
/// The runtime service only ever reads what this writes.
#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(path = %config.database_path, "initializing database");

    let pool = match db::init_pool(&config.database_path).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "schema migration failed");
            std::process::exit(1);
        }
    };

    if let Err(err) = db::seed::run_seed(&pool, &config.seed_dir).await {
        tracing::error!(error = %err, "seeding failed");
        std::process::exit(1);
    }

    pool.close().await;
    tracing::info!("database ready");
}
