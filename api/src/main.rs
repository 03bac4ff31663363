use api::{app, state::AppState};
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use util::{config, logging::init_logging};

#[tokio::main]
async fn main() {
    // Load configuration and initialize logging
    let _log_guard = init_logging(&config::log_file(), "api=info");

    if config::env().eq_ignore_ascii_case("production")
        && config::jwt_secret() == config::DEV_JWT_SECRET
    {
        panic!("JWT_SECRET must be set in production");
    }

    let db = db::connect().await;
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let app_state = AppState::from_config(db)
        .await
        .expect("Failed to initialise application state");

    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .expect("Invalid address");

    tracing::info!(%addr, project = %config::project_name(), "starting server");
    println!(
        "Starting {} on http://{}:{}",
        config::project_name(),
        config::host(),
        config::port()
    );

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app(app_state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server crashed");
}
