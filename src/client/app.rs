use chrono::{DateTime, Local, Utc};

use super::export::export_history;
use super::history::History;
use super::input::InputState;
use super::markdown::{escape_html, render_markdown};
use super::relay::RelayTransport;
use super::settings::{Settings, SettingsRepository};
use super::theme::{Theme, resolve_theme};
use super::view::View;
use crate::ai::models::ChatModel;
use crate::api::public::chat::ChatRequest;
use crate::core::Clock;
use crate::openai::Role;

const CONFIRM_RESET: &str = "确定要重新开始对话吗？当前的聊天记录将被清除。";
const NOTHING_TO_EXPORT: &str = "暂无聊天记录可导出";
const EXPORTED: &str = "聊天记录已成功导出！";
const EXPORT_FAILED: &str = "导出聊天记录失败";
const SETTINGS_SAVE_FAILED: &str = "设置保存失败";

/// Which screen the client is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Welcome,
    Conversation,
}

/// The chat client. Constructed once and owned by whatever drives the
/// UI; every operation receives the view it should update.
///
/// History policy: the user's turn goes into history as soon as it is
/// sent, so the transcript and history always agree. When a send fails
/// that turn stays in history without a reply.
pub struct ChatApp {
    relay: Box<dyn RelayTransport>,
    settings_repo: Box<dyn SettingsRepository>,
    clock: Box<dyn Clock>,
    settings: Settings,
    system_theme: Theme,
    mode: Mode,
    history: History,
    input: String,
    in_flight: bool,
}

impl ChatApp {
    pub fn new(
        relay: Box<dyn RelayTransport>,
        settings_repo: Box<dyn SettingsRepository>,
        clock: Box<dyn Clock>,
        system_theme: Theme,
        view: &mut dyn View,
    ) -> Self {
        let settings = settings_repo.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        });

        let app = Self {
            relay,
            settings_repo,
            clock,
            settings,
            system_theme,
            mode: Mode::Welcome,
            history: History::new(),
            input: String::new(),
            in_flight: false,
        };

        view.apply_theme(app.theme());
        view.show_welcome();
        app.render_input(view);
        app
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn theme(&self) -> Theme {
        resolve_theme(self.settings.theme_preference, self.system_theme)
    }

    pub fn input_state(&self) -> InputState {
        InputState::new(&self.input, self.in_flight)
    }

    fn render_input(&self, view: &mut dyn View) {
        view.update_input(&self.input, &self.input_state());
    }

    pub fn set_input(&mut self, text: &str, view: &mut dyn View) {
        self.input = text.to_string();
        self.render_input(view);
    }

    /// Put a suggested prompt in the input without sending it.
    pub fn apply_suggestion(&mut self, text: &str, view: &mut dyn View) {
        self.set_input(text, view);
    }

    /// Send whatever is in the input. Returns false when nothing was
    /// sent because the input is blank or a turn is in flight.
    pub async fn send(&mut self, view: &mut dyn View) -> bool {
        let message = self.input.trim().to_string();
        if message.is_empty() || self.in_flight {
            return false;
        }

        if self.mode == Mode::Welcome {
            self.mode = Mode::Conversation;
            view.show_conversation();
        }

        let sent_at = self.clock.now();
        view.append_message(Role::User, &escape_html(&message), &bubble_time(sent_at));

        // The window is taken before this turn is recorded since the
        // new message travels separately.
        let request = self.request_for(&message);
        self.history.push(Role::User, &message, sent_at);

        self.input.clear();
        self.in_flight = true;
        self.render_input(view);
        view.set_typing(true);

        match self.relay.send(&request).await {
            Ok(reply) => {
                let received_at = self.clock.now();
                view.append_message(
                    Role::Assistant,
                    &render_markdown(&reply),
                    &bubble_time(received_at),
                );
                self.history.push(Role::Assistant, &reply, received_at);
            }
            Err(e) => {
                tracing::warn!("Failed to send message: {}", e);
                view.alert(&e.to_string());
            }
        }

        self.in_flight = false;
        view.set_typing(false);
        self.render_input(view);
        true
    }

    /// Put a suggested prompt in the input and send it.
    pub async fn send_suggestion(&mut self, text: &str, view: &mut dyn View) -> bool {
        self.set_input(text, view);
        self.send(view).await
    }

    fn request_for(&self, message: &str) -> ChatRequest {
        ChatRequest {
            message: Some(message.to_string()),
            history: self.history.upstream_window(),
            model: self.settings.selected_model.as_str().to_string(),
            personality: Some(self.settings.custom_personality.clone()),
        }
    }

    /// Start over. Asks first when there is something to lose. Returns
    /// whether the conversation was cleared.
    pub fn reset(&mut self, view: &mut dyn View) -> bool {
        if !self.history.is_empty() && !view.confirm(CONFIRM_RESET) {
            return false;
        }

        self.history.clear();
        view.clear_messages();
        self.mode = Mode::Welcome;
        view.show_welcome();
        self.input.clear();
        self.render_input(view);
        true
    }

    pub fn export(&mut self, view: &mut dyn View) {
        match export_history(&self.history, self.clock.now()) {
            Ok(Some(file)) => {
                view.download(&file.file_name, &file.contents);
                view.alert(EXPORTED);
            }
            Ok(None) => view.alert(NOTHING_TO_EXPORT),
            Err(e) => {
                tracing::error!("Failed to export chat: {}", e);
                view.alert(EXPORT_FAILED);
            }
        }
    }

    /// Flip the theme and remember the choice over the system setting.
    pub fn toggle_theme(&mut self, view: &mut dyn View) {
        let theme = self.theme().toggled();
        self.settings.theme_preference = Some(theme);
        if let Err(e) = self.settings_repo.save(&self.settings) {
            tracing::error!("Failed to save theme preference: {}", e);
        }
        view.apply_theme(theme);
    }

    /// Follow the system theme unless the user picked one.
    pub fn system_theme_changed(&mut self, theme: Theme, view: &mut dyn View) {
        self.system_theme = theme;
        if self.settings.theme_preference.is_none() {
            view.apply_theme(theme);
        }
    }

    pub fn save_settings(&mut self, model: ChatModel, personality: &str, view: &mut dyn View) {
        self.settings.selected_model = model;
        self.settings.custom_personality = personality.trim().to_string();

        match self.settings_repo.save(&self.settings) {
            Ok(()) => view.alert(&format!("模型已切换至 {}", model.display_name())),
            Err(e) => {
                tracing::error!("Failed to save settings: {}", e);
                view.alert(SETTINGS_SAVE_FAILED);
            }
        }
    }
}

fn bubble_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::{Error, Result, anyhow};
    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::client::input::CharTier;
    use crate::client::settings::InMemorySettings;
    use crate::core::FixedClock;
    use crate::openai::Message;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Welcome,
        Conversation,
        Message(Role, String),
        Cleared,
        Input(String, bool),
        Typing(bool),
        Alert(String),
        Download(String, String),
        Theme(Theme),
    }

    #[derive(Default)]
    struct RecordingView {
        events: Vec<Event>,
        confirm_answer: bool,
    }

    impl RecordingView {
        fn alerts(&self) -> Vec<String> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Alert(msg) => Some(msg.clone()),
                    _ => None,
                })
                .collect()
        }

        fn messages(&self) -> Vec<(Role, String)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Message(role, html) => Some((*role, html.clone())),
                    _ => None,
                })
                .collect()
        }
    }

    impl View for RecordingView {
        fn show_welcome(&mut self) {
            self.events.push(Event::Welcome);
        }
        fn show_conversation(&mut self) {
            self.events.push(Event::Conversation);
        }
        fn append_message(&mut self, role: Role, html: &str, _time: &str) {
            self.events.push(Event::Message(role, html.to_string()));
        }
        fn clear_messages(&mut self) {
            self.events.push(Event::Cleared);
        }
        fn update_input(&mut self, text: &str, state: &InputState) {
            self.events
                .push(Event::Input(text.to_string(), state.send_enabled));
        }
        fn set_typing(&mut self, visible: bool) {
            self.events.push(Event::Typing(visible));
        }
        fn alert(&mut self, message: &str) {
            self.events.push(Event::Alert(message.to_string()));
        }
        fn confirm(&mut self, _message: &str) -> bool {
            self.confirm_answer
        }
        fn download(&mut self, file_name: &str, contents: &str) {
            self.events
                .push(Event::Download(file_name.to_string(), contents.to_string()));
        }
        fn apply_theme(&mut self, theme: Theme) {
            self.events.push(Event::Theme(theme));
        }
    }

    /// Replies with queued results and records every request.
    #[derive(Clone, Default)]
    struct FakeRelay {
        replies: Arc<Mutex<Vec<Result<String, String>>>>,
        requests: Arc<Mutex<Vec<ChatRequest>>>,
    }

    impl FakeRelay {
        fn replying(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies)),
                requests: Arc::default(),
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RelayTransport for FakeRelay {
        async fn send(&self, request: &ChatRequest) -> Result<String, Error> {
            self.requests.lock().unwrap().push(request.clone());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(anyhow!("no reply queued"));
            }
            replies.remove(0).map_err(|e| anyhow!(e))
        }
    }

    /// Shares its contents so tests can inspect what was saved.
    #[derive(Clone, Default)]
    struct SharedSettings(Arc<InMemorySettings>);

    impl SettingsRepository for SharedSettings {
        fn load(&self) -> Result<Settings> {
            self.0.load()
        }
        fn save(&self, settings: &Settings) -> Result<()> {
            self.0.save(settings)
        }
    }

    fn clock() -> Box<FixedClock> {
        Box::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap()))
    }

    fn app_with(relay: FakeRelay, settings: SharedSettings, view: &mut RecordingView) -> ChatApp {
        ChatApp::new(
            Box::new(relay),
            Box::new(settings),
            clock(),
            Theme::Light,
            view,
        )
    }

    #[test]
    fn it_starts_on_the_welcome_screen() {
        let mut view = RecordingView::default();
        let app = app_with(FakeRelay::default(), SharedSettings::default(), &mut view);
        assert_eq!(app.mode(), Mode::Welcome);
        assert_eq!(
            view.events,
            vec![
                Event::Theme(Theme::Light),
                Event::Welcome,
                Event::Input(String::new(), false)
            ]
        );
    }

    #[test]
    fn it_tracks_input_state() {
        let mut view = RecordingView::default();
        let mut app = app_with(FakeRelay::default(), SharedSettings::default(), &mut view);

        app.set_input(&"a".repeat(799), &mut view);
        assert_eq!(app.input_state().tier, CharTier::Normal);
        app.set_input(&"a".repeat(800), &mut view);
        assert_eq!(app.input_state().tier, CharTier::Warning);
        app.set_input(&"a".repeat(950), &mut view);
        assert_eq!(app.input_state().tier, CharTier::Danger);

        app.set_input("   ", &mut view);
        assert!(!app.input_state().send_enabled);
    }

    #[tokio::test]
    async fn it_sends_and_records_both_turns() {
        let relay = FakeRelay::replying(vec![Ok("**hi** there".to_string())]);
        let mut view = RecordingView::default();
        let mut app = app_with(relay.clone(), SharedSettings::default(), &mut view);
        view.events.clear();

        app.set_input("  <hello>  ", &mut view);
        assert!(app.send(&mut view).await);

        assert_eq!(app.mode(), Mode::Conversation);
        assert_eq!(app.input(), "");
        assert!(!app.is_in_flight());
        assert_eq!(app.history().len(), 2);
        assert_eq!(
            view.messages(),
            vec![
                (Role::User, "&lt;hello&gt;".to_string()),
                (Role::Assistant, "<strong>hi</strong> there".to_string()),
            ]
        );

        // Send flow ordering
        let flow: Vec<Event> = view.events[1..].to_vec();
        assert_eq!(
            flow,
            vec![
                Event::Conversation,
                Event::Message(Role::User, "&lt;hello&gt;".to_string()),
                Event::Input(String::new(), false),
                Event::Typing(true),
                Event::Message(Role::Assistant, "<strong>hi</strong> there".to_string()),
                Event::Typing(false),
                Event::Input(String::new(), false),
            ]
        );

        let requests = relay.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message.as_deref(), Some("<hello>"));
        assert!(requests[0].history.is_empty());
        assert_eq!(requests[0].model, "gpt-4.1");
        assert_eq!(requests[0].personality.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn it_ignores_blank_input() {
        let relay = FakeRelay::default();
        let mut view = RecordingView::default();
        let mut app = app_with(relay.clone(), SharedSettings::default(), &mut view);

        app.set_input(" \n ", &mut view);
        assert!(!app.send(&mut view).await);
        assert_eq!(app.mode(), Mode::Welcome);
        assert!(relay.requests().is_empty());
    }

    #[tokio::test]
    async fn it_keeps_the_user_turn_when_a_send_fails() {
        let relay = FakeRelay::replying(vec![
            Err("服务器开小差了".to_string()),
            Ok("second reply".to_string()),
        ]);
        let mut view = RecordingView::default();
        let mut app = app_with(relay.clone(), SharedSettings::default(), &mut view);

        app.set_input("first", &mut view);
        app.send(&mut view).await;
        assert_eq!(view.alerts(), vec!["服务器开小差了".to_string()]);
        assert_eq!(app.history().len(), 1);
        assert!(!app.is_in_flight());
        assert_eq!(app.mode(), Mode::Conversation);

        app.set_input("second", &mut view);
        app.send(&mut view).await;

        let requests = relay.requests();
        assert_eq!(
            requests[1].history,
            vec![Message::new(Role::User, "first")]
        );
        assert_eq!(app.history().len(), 3);
    }

    #[tokio::test]
    async fn it_sends_only_the_last_ten_turns() {
        let replies = (0..7).map(|i| Ok(format!("reply {}", i))).collect();
        let relay = FakeRelay::replying(replies);
        let mut view = RecordingView::default();
        let mut app = app_with(relay.clone(), SharedSettings::default(), &mut view);

        for i in 0..7 {
            app.send_suggestion(&format!("question {}", i), &mut view).await;
        }

        let requests = relay.requests();
        assert_eq!(requests[5].history.len(), 10);
        assert_eq!(requests[6].history.len(), 10);
        assert_eq!(
            requests[6].history[0],
            Message::new(Role::User, "question 1")
        );
        assert_eq!(app.history().len(), 14);
    }

    #[tokio::test]
    async fn it_sends_suggestions_through_the_input() {
        let relay = FakeRelay::replying(vec![Ok("sure".to_string())]);
        let mut view = RecordingView::default();
        let mut app = app_with(relay.clone(), SharedSettings::default(), &mut view);

        app.set_input("draft", &mut view);
        view.events.clear();
        assert!(app.send_suggestion("讲个笑话", &mut view).await);
        assert_eq!(app.input(), "");
        assert_eq!(view.events[0], Event::Input("讲个笑话".to_string(), true));
        assert_eq!(relay.requests()[0].message.as_deref(), Some("讲个笑话"));

        app.apply_suggestion("今天天气如何？", &mut view);
        assert_eq!(app.input(), "今天天气如何？");
        assert_eq!(app.history().len(), 2);
    }

    #[tokio::test]
    async fn it_resets_only_when_confirmed() {
        let relay = FakeRelay::replying(vec![Ok("hello".to_string())]);
        let mut view = RecordingView::default();
        let mut app = app_with(relay, SharedSettings::default(), &mut view);

        app.send_suggestion("hi", &mut view).await;

        view.confirm_answer = false;
        assert!(!app.reset(&mut view));
        assert_eq!(app.history().len(), 2);
        assert_eq!(app.mode(), Mode::Conversation);

        view.confirm_answer = true;
        assert!(app.reset(&mut view));
        assert!(app.history().is_empty());
        assert_eq!(app.mode(), Mode::Welcome);
        assert!(view.events.contains(&Event::Cleared));
    }

    #[test]
    fn it_resets_an_empty_conversation_without_asking() {
        let mut view = RecordingView::default();
        let mut app = app_with(FakeRelay::default(), SharedSettings::default(), &mut view);
        view.confirm_answer = false;
        assert!(app.reset(&mut view));
    }

    #[test]
    fn it_does_not_export_an_empty_history() {
        let mut view = RecordingView::default();
        let mut app = app_with(FakeRelay::default(), SharedSettings::default(), &mut view);

        app.export(&mut view);
        assert_eq!(view.alerts(), vec![NOTHING_TO_EXPORT.to_string()]);
        assert!(!view
            .events
            .iter()
            .any(|e| matches!(e, Event::Download(_, _))));
    }

    #[tokio::test]
    async fn it_exports_every_message() {
        let relay = FakeRelay::replying(vec![Ok("a1".to_string()), Ok("a2".to_string())]);
        let mut view = RecordingView::default();
        let mut app = app_with(relay, SharedSettings::default(), &mut view);

        app.send_suggestion("q1", &mut view).await;
        app.send_suggestion("q2", &mut view).await;
        app.export(&mut view);

        let (file_name, contents) = view
            .events
            .iter()
            .find_map(|e| match e {
                Event::Download(name, contents) => Some((name.clone(), contents.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(file_name, "square-chat_2025-06-01T03-00-00.txt");
        assert_eq!(contents.lines().filter(|l| l.starts_with('#')).count(), 4);
        assert_eq!(view.alerts().last().unwrap(), EXPORTED);
    }

    #[test]
    fn it_loads_and_saves_settings() {
        let settings = SharedSettings::default();
        settings
            .save(&Settings {
                selected_model: ChatModel::O4Mini,
                custom_personality: "be brief".to_string(),
                theme_preference: None,
            })
            .unwrap();

        let mut view = RecordingView::default();
        let mut app = app_with(FakeRelay::default(), settings.clone(), &mut view);
        assert_eq!(app.settings().selected_model, ChatModel::O4Mini);
        assert_eq!(app.settings().custom_personality, "be brief");

        app.save_settings(ChatModel::Gpt41Mini, "  pirate  ", &mut view);
        let saved = settings.load().unwrap();
        assert_eq!(saved.selected_model, ChatModel::Gpt41Mini);
        assert_eq!(saved.custom_personality, "pirate");
        assert_eq!(view.alerts(), vec!["模型已切换至 GPT-4.1 Mini".to_string()]);
    }

    #[tokio::test]
    async fn it_sends_saved_settings_with_each_turn() {
        let relay = FakeRelay::replying(vec![Ok("ok".to_string())]);
        let mut view = RecordingView::default();
        let mut app = app_with(relay.clone(), SharedSettings::default(), &mut view);

        app.save_settings(ChatModel::O4Mini, "Speak in haiku", &mut view);
        app.send_suggestion("hello", &mut view).await;

        let request = &relay.requests()[0];
        assert_eq!(request.model, "o4-mini");
        assert_eq!(request.personality.as_deref(), Some("Speak in haiku"));
    }

    #[test]
    fn it_persists_theme_override() {
        let settings = SharedSettings::default();
        let mut view = RecordingView::default();
        let mut app = app_with(FakeRelay::default(), settings.clone(), &mut view);
        assert_eq!(app.theme(), Theme::Light);

        // Follows the system until overridden
        app.system_theme_changed(Theme::Dark, &mut view);
        assert_eq!(app.theme(), Theme::Dark);

        app.toggle_theme(&mut view);
        assert_eq!(app.theme(), Theme::Light);
        assert_eq!(settings.load().unwrap().theme_preference, Some(Theme::Light));

        view.events.clear();
        app.system_theme_changed(Theme::Dark, &mut view);
        assert_eq!(app.theme(), Theme::Light);
        assert!(view.events.is_empty());
    }

    #[test]
    fn it_applies_stored_theme_at_startup() {
        let settings = SharedSettings::default();
        settings
            .save(&Settings {
                theme_preference: Some(Theme::Dark),
                ..Settings::default()
            })
            .unwrap();
        let mut view = RecordingView::default();
        let app = app_with(FakeRelay::default(), settings, &mut view);
        assert_eq!(app.theme(), Theme::Dark);
        assert_eq!(view.events[0], Event::Theme(Theme::Dark));
    }
}
