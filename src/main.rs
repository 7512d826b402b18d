use std::net::{IpAddr, SocketAddr};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use digital_menu_api::{
    app::build_app, config::AppConfig, services::auth_service::ensure_staff_account,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,digital_menu_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let addr = SocketAddr::from((config.host.parse::<IpAddr>()?, config.port));
    let state = AppState::from_config(config).await?;

    if let (Some(email), Some(password)) =
        (&state.config.staff_email, &state.config.staff_password)
    {
        ensure_staff_account(state.store.as_ref(), email, password, "staff").await?;
    }

    let app = build_app(state);
    tracing::info!("listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
