mod core;

pub use self::core::{
    CompletionParams, Message, Role, completion, completion_payload, first_choice_content,
};
