use super::input::InputState;
use super::theme::Theme;
use crate::openai::Role;

/// The surface the chat client draws on. A browser would map these to
/// DOM updates; the terminal front end prints them.
pub trait View {
    fn show_welcome(&mut self);
    fn show_conversation(&mut self);
    /// `html` is already safe to insert as markup.
    fn append_message(&mut self, role: Role, html: &str, time: &str);
    fn clear_messages(&mut self);
    fn update_input(&mut self, text: &str, state: &InputState);
    fn set_typing(&mut self, visible: bool);
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
    fn download(&mut self, file_name: &str, contents: &str);
    fn apply_theme(&mut self, theme: Theme);
}
