use std::env;

use crate::ai::prompt::DEFAULT_PERSONA;
use crate::api::maintenance::MaintenanceWindow;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: String,
    pub static_dir: String,
    pub llm_api_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub system_message: String,
    // Expose raw upstream errors to clients
    pub development: bool,
    pub maintenance: MaintenanceWindow,
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = env::var("SQUARE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3001".to_string());
        let static_dir = env::var("SQUARE_STATIC_DIR").unwrap_or_else(|_| "./public".to_string());
        let llm_api_url = env::var("SQUARE_LLM_URL").unwrap_or_default();
        let llm_api_key = env::var("SQUARE_LLM_API_KEY").unwrap_or_default();
        let llm_model =
            env::var("SQUARE_LLM_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string());
        let system_message =
            env::var("SQUARE_SYSTEM_MESSAGE").unwrap_or_else(|_| DEFAULT_PERSONA.to_string());
        let development = env::var("SQUARE_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .map(|v| is_development(&v))
            .unwrap_or(false);

        Self {
            host,
            port,
            static_dir,
            llm_api_url,
            llm_api_key,
            llm_model,
            system_message,
            development,
            maintenance: MaintenanceWindow::default(),
        }
    }
}

fn is_development(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("development")
}
