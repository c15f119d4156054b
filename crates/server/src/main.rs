use anyhow::Result;
use db::DBService;
use server::{AppState, app, config::ServerConfig};
use services::services::ai_lookup::AiMaintenanceLookup;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::log::init("info,sqlx=warn");

    let config = ServerConfig::from_env()?;
    let db = DBService::new(&config.database_url).await?;

    let ai = match AiMaintenanceLookup::from_env() {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "AI fallback disabled");
            None
        }
    };

    let state = AppState::new(db, ai);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "maintenance service listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
