use std::env;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// A stored override always beats the system preference.
pub fn resolve_theme(stored: Option<Theme>, system: Theme) -> Theme {
    stored.unwrap_or(system)
}

/// Guess the terminal background from `COLORFGBG` ("fg;bg"). Low
/// background color indexes are dark.
pub fn detect_system_theme() -> Theme {
    env::var("COLORFGBG")
        .ok()
        .and_then(|v| theme_from_colorfgbg(&v))
        .unwrap_or_default()
}

fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    if bg < 7 || bg == 8 {
        Some(Theme::Dark)
    } else {
        Some(Theme::Light)
    }
}
