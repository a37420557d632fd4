use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use htmd::HtmlToMarkdown;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::ai::models::ChatModel;
use crate::client::input::{CharTier, InputState, SOFT_CHAR_LIMIT};
use crate::client::theme::detect_system_theme;
use crate::client::{ChatApp, HttpRelay, JsonFileSettings, Theme, View};
use crate::core::SystemClock;
use crate::openai::Role;

const SUGGESTIONS: [&str; 3] = ["讲个程序员笑话", "帮我写一段 Rust 代码", "今天有什么推荐的书？"];

const HELP: &str = "Commands:
  /clear             start a new conversation (Ctrl+K in the browser)
  /export            save the conversation to a text file
  /theme             toggle light/dark
  /model <id>        switch model: gpt-4.1, o4-mini, gpt-4.1-mini
  /persona [text]    set a custom persona, empty to use the default
  /settings          show current settings
  /suggest <n>       send suggestion number n
  /help              show this help
  /quit              exit";

#[derive(Debug, PartialEq)]
enum Command {
    Send(String),
    Clear,
    Export,
    Theme,
    Model(String),
    Persona(String),
    Settings,
    Suggest(String),
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Send(line.to_string());
    };
    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((rest, ""));

    match name {
        "clear" => Command::Clear,
        "export" => Command::Export,
        "theme" => Command::Theme,
        "model" => Command::Model(arg.to_string()),
        "persona" => Command::Persona(arg.to_string()),
        "settings" => Command::Settings,
        "suggest" => Command::Suggest(arg.to_string()),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// Draws the chat client in a terminal.
struct TerminalView {
    editor: DefaultEditor,
    converter: HtmlToMarkdown,
    export_dir: PathBuf,
    theme: Theme,
}

impl TerminalView {
    fn new(export_dir: &Path) -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            converter: HtmlToMarkdown::builder()
                .skip_tags(vec!["script", "style"])
                .build(),
            export_dir: export_dir.to_path_buf(),
            theme: Theme::default(),
        })
    }

    fn readline(&mut self, prompt: &str) -> rustyline::Result<String> {
        let line = self.editor.readline(prompt)?;
        if !line.trim().is_empty() {
            let _ = self.editor.add_history_entry(line.as_str());
        }
        Ok(line)
    }

    fn accent(&self, role: Role) -> &'static str {
        match (self.theme, role) {
            (Theme::Dark, Role::User) => "\x1b[96m",
            (Theme::Dark, _) => "\x1b[95m",
            (Theme::Light, Role::User) => "\x1b[34m",
            (Theme::Light, _) => "\x1b[35m",
        }
    }

    fn to_text(&self, html: &str) -> String {
        self.converter
            .convert(html)
            .unwrap_or_else(|_| html.to_string())
    }
}

impl View for TerminalView {
    fn show_welcome(&mut self) {
        println!("🤖 Square 虚拟伴侣已准备就绪！输入 /help 查看命令");
        for (i, s) in SUGGESTIONS.iter().enumerate() {
            println!("  {}. {}", i + 1, s);
        }
    }

    fn show_conversation(&mut self) {
        println!();
    }

    fn append_message(&mut self, role: Role, html: &str, time: &str) {
        let who = if role == Role::User { "我" } else { "Square" };
        println!(
            "{}{} [{}]\x1b[0m\n{}\n",
            self.accent(role),
            who,
            time,
            self.to_text(html)
        );
    }

    fn clear_messages(&mut self) {
        // Clear screen and move the cursor home
        print!("\x1b[2J\x1b[H");
    }

    fn update_input(&mut self, _text: &str, state: &InputState) {
        match state.tier {
            CharTier::Normal => {}
            CharTier::Warning => println!(
                "\x1b[33m{}/{}\x1b[0m",
                state.char_count, SOFT_CHAR_LIMIT
            ),
            CharTier::Danger => println!(
                "\x1b[31m{}/{}\x1b[0m",
                state.char_count, SOFT_CHAR_LIMIT
            ),
        }
    }

    fn set_typing(&mut self, visible: bool) {
        if visible {
            println!("Square 正在输入...");
        }
    }

    fn alert(&mut self, message: &str) {
        println!("⚠️  {}", message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        match self.readline(&format!("{} (y/N) ", message)) {
            Ok(answer) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }

    fn download(&mut self, file_name: &str, contents: &str) {
        let path = self.export_dir.join(file_name);
        match fs::write(&path, contents) {
            Ok(()) => println!("Saved {}", path.display()),
            Err(e) => tracing::error!("Failed to write {}: {}", path.display(), e),
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

pub async fn run(server: &str, settings_path: &Path) -> Result<()> {
    let mut view = TerminalView::new(Path::new("."))?;
    let mut app = ChatApp::new(
        Box::new(HttpRelay::new(server)),
        Box::new(JsonFileSettings::new(settings_path)),
        Box::new(SystemClock),
        detect_system_theme(),
        &mut view,
    );

    loop {
        let readline = view.readline(">>> ");
        match readline {
            Ok(line) => match parse_command(&line) {
                Command::Send(text) => {
                    app.set_input(&text, &mut view);
                    app.send(&mut view).await;
                }
                Command::Clear => {
                    app.reset(&mut view);
                }
                Command::Export => app.export(&mut view),
                Command::Theme => {
                    app.toggle_theme(&mut view);
                    println!("Theme: {:?}", app.theme());
                }
                Command::Model(name) => match name.parse::<ChatModel>() {
                    Ok(model) => {
                        let persona = app.settings().custom_personality.clone();
                        app.save_settings(model, &persona, &mut view);
                    }
                    Err(e) => println!("{}", e),
                },
                Command::Persona(text) => {
                    let model = app.settings().selected_model;
                    app.save_settings(model, &text, &mut view);
                }
                Command::Settings => {
                    let settings = app.settings();
                    println!("Model: {}", settings.selected_model.display_name());
                    println!("Persona: {}", settings.custom_personality);
                }
                Command::Suggest(n) => {
                    let pick = n
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| i.checked_sub(1))
                        .and_then(|i| SUGGESTIONS.get(i));
                    match pick {
                        Some(text) => {
                            app.send_suggestion(text, &mut view).await;
                        }
                        None => println!("No suggestion {}", n),
                    }
                }
                Command::Help => println!("{}", HELP),
                Command::Quit => break,
                Command::Unknown(name) => println!("Unknown command /{}, try /help", name),
            },
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
