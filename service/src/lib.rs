use config::Config;
use sse::Bus;

pub mod config;
pub mod logging;

// Service-level state shared by every connection.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub bus: Bus,
}

impl AppState {
    pub fn new(app_config: Config, bus: Bus) -> Self {
        Self {
            config: app_config,
            bus,
        }
    }
}
