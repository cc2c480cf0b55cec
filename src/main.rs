use std::time::Duration;

use recipebook::{app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "recipebook=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let (state, store) = AppState::init().await?;

    sqlx::migrate!("./migrations").run(store.pool()).await?;

    if let Some(secs) = state.config.auth.purge_interval_secs {
        tracing::info!(interval_secs = secs, "starting expired token purge task");
        state.auth.spawn_purge_task(Duration::from_secs(secs.max(1)));
    }

    let addr = state.config.bind_addr();
    app::serve(app::build_app(state), &addr).await
}
