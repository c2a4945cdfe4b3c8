use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use society_portal_server::config::Config;
use society_portal_server::db::{seed, Db};
use society_portal_server::routes::create_routes;
use society_portal_server::state::AppState;
use society_portal_server::sweeper;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let db = Db::new(pool);
    seed::ensure_defaults(&db, &config.admin_name)
        .await
        .expect("Failed to seed default data");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    tokio::spawn(sweeper::run(db.clone(), config.sweep_interval));
    tracing::info!(
        interval_secs = config.sweep_interval.as_secs(),
        "Announcement sweeper started"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState {
        db,
        config: Arc::new(config),
    };
    let app: Router = create_routes(state);

    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
