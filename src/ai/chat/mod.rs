mod core;
mod models;

pub use self::core::Relay;
pub use models::{HISTORY_WINDOW, Transcript, recent_window};
