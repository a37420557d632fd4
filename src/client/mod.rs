//! The chat client: a single stateful controller over a conversation,
//! plus the pieces it is built from.

mod app;
pub mod export;
pub mod history;
pub mod input;
pub mod markdown;
pub mod relay;
pub mod settings;
pub mod theme;
mod view;

pub use app::{ChatApp, Mode};
pub use relay::{HttpRelay, RelayTransport};
pub use settings::{InMemorySettings, JsonFileSettings, Settings, SettingsRepository};
pub use theme::Theme;
pub use view::View;
