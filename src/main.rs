use log::*;
use service::{config::Config, logging::Logger, AppState};
use sse::Bus;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    Logger::init_logger(&config)?;

    info!("Starting up channel relay...");

    let app_state = AppState::new(config, Bus::new());

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        return Err(e.into());
    }

    Ok(())
}
