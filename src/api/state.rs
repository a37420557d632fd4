use std::sync::Arc;

use crate::ai::chat::Relay;
use crate::ai::models::{ModelRouter, StaticModelTable};
use crate::core::{AppConfig, Clock, SystemClock};

/// Process wide state shared by every request. Nothing in here is
/// mutated after startup.
pub struct AppState {
    pub config: AppConfig,
    pub clock: Arc<dyn Clock>,
    pub relay: Relay,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let models: Arc<dyn ModelRouter> =
            Arc::new(StaticModelTable::collapsed(&config.llm_model));
        Self::with_parts(config, Arc::new(SystemClock), models)
    }

    pub fn with_parts(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        models: Arc<dyn ModelRouter>,
    ) -> Self {
        let relay = Relay::new(&config, models);
        Self {
            config,
            clock,
            relay,
        }
    }

    /// Replace the clock, e.g. to pin the maintenance window in tests.
    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let models: Arc<dyn ModelRouter> =
            Arc::new(StaticModelTable::collapsed(&config.llm_model));
        Self::with_parts(config, clock, models)
    }
}
