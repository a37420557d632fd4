//! Input box affordances: character counter, auto height, send button
//! and suggestion visibility.

/// Soft cap shown next to the counter. Only enforced visually.
pub const SOFT_CHAR_LIMIT: usize = 1000;
pub const WARNING_THRESHOLD: usize = 800;
pub const DANGER_THRESHOLD: usize = 950;

pub const LINE_HEIGHT_PX: u32 = 24;
pub const MAX_INPUT_HEIGHT_PX: u32 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharTier {
    Normal,
    Warning,
    Danger,
}

impl CharTier {
    pub fn for_count(count: usize) -> Self {
        if count >= DANGER_THRESHOLD {
            CharTier::Danger
        } else if count >= WARNING_THRESHOLD {
            CharTier::Warning
        } else {
            CharTier::Normal
        }
    }
}

/// Everything a view needs to redraw the input area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputState {
    pub char_count: usize,
    pub tier: CharTier,
    pub height_px: u32,
    pub send_enabled: bool,
    pub show_suggestions: bool,
}

impl InputState {
    pub fn new(text: &str, in_flight: bool) -> Self {
        let char_count = char_count(text);
        Self {
            char_count,
            tier: CharTier::for_count(char_count),
            height_px: input_height(text),
            send_enabled: can_send(text, in_flight),
            show_suggestions: show_suggestions(text),
        }
    }
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Grows with the number of lines up to the max height.
pub fn input_height(text: &str) -> u32 {
    let lines = text.split('\n').count().max(1) as u32;
    (lines * LINE_HEIGHT_PX).min(MAX_INPUT_HEIGHT_PX)
}

pub fn can_send(text: &str, in_flight: bool) -> bool {
    !in_flight && !text.trim().is_empty()
}

/// Suggestions help with short, just started inputs.
pub fn show_suggestions(text: &str) -> bool {
    let count = char_count(text);
    count > 0 && count < 10
}
