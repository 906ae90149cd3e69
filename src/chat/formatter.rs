use crate::web::models::{Message, Turn};

pub fn build_messages(system_prompt: &str, history: &[Turn], new_text: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(Message::system(system_prompt));

    for turn in history {
        messages.push(Message::user(turn.user.as_str()));
        messages.push(Message::assistant(turn.assistant.as_str()));
    }

    messages.push(Message::user(new_text));
    messages
}
