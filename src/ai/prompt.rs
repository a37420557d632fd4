//! Reusable prompts and text templates. Templates use Handlebars
//! since it can't do much out of the box without registering your
//! own helpers, which is what you want when rendering text that came
//! from an LLM.

use std::fmt;

use handlebars::{Handlebars, handlebars_helper};

// A simple `inc` helper for use with `each` and `@index` so that
// there can be natural number sequences when rendering (instead of
// starting at 0).
handlebars_helper!(inc: |v: i64| format!("{}", v + 1));

/// The persona used when the user hasn't set one.
pub const DEFAULT_PERSONA: &str = "你是一个开朗幽默、细心善解人意的AI虚拟软件工程师，名字叫方块（Square LLM）。
- 性格：开朗、幽默、细心，善于用技术和人文关怀陪伴用户，喜欢用幽默解决复杂问题。
- 兴趣：编程、阅读、户外运动、科幻喜剧电影。
- 理念：用代码创造无限可能，做用户最懂的AI伙伴。
- 亮点：善解人意、幽默风趣、责任感强、情绪稳定。
- 回答风格：自然、简洁、温暖，偶尔带点幽默和emoji。
请用中文回复，保持自然对话风格。";

/// Pick the system prompt for a turn. A custom persona is used
/// verbatim as long as it has any non-whitespace content.
pub fn persona_prompt(custom: Option<&str>, default_persona: &str) -> String {
    match custom {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => default_persona.to_string(),
    }
}

#[derive(Debug)]
pub enum Prompt {
    ChatExport,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Prompt> for String {
    fn from(item: Prompt) -> String {
        format!("{:?}", item)
    }
}

const CHAT_EXPORT_TEMPLATE: &str = r"{{title}}
导出时间: {{exported_at}}
消息总数: {{total}} 条

{{separator}}

{{#each messages}}
#{{inc @index}} [{{timestamp}}] {{sender}}:
{{content}}

{{/each}}";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    // Output is plain text, not HTML
    registry.register_escape_fn(handlebars::no_escape);
    registry.register_helper("inc", Box::new(inc));
    registry
        .register_template_string(&Prompt::ChatExport.to_string(), CHAT_EXPORT_TEMPLATE)
        .expect("Failed to register template");
    registry
}
