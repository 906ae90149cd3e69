use log::{debug, error, info};
use std::sync::Arc;

use crate::chat::filter::TopicFilter;
use crate::chat::formatter::build_messages;
use crate::config::AssistantConfig;
use crate::model::ChatCompletion;
use crate::web::models::Turn;

// One turn at a time; callers serialize access
pub struct ChatSession {
    config: Arc<AssistantConfig>,
    filter: Arc<TopicFilter>,
    client: Arc<dyn ChatCompletion>,
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn new(
        config: Arc<AssistantConfig>,
        filter: Arc<TopicFilter>,
        client: Arc<dyn ChatCompletion>,
    ) -> Self {
        Self {
            config,
            filter,
            client,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    // Always appends exactly one turn, failures included
    pub async fn handle_turn(&mut self, input_text: &str) -> (&[Turn], String) {
        debug!("Filtering input: {}", input_text);

        let reply = if !self.filter.is_in_scope(input_text) {
            info!("Input rejected as out of scope");
            self.config.rejection_message.clone()
        } else {
            let messages = build_messages(&self.config.system_prompt, &self.history, input_text);
            info!("Calling completion backend with {} prior turns", self.history.len());

            match self.client.complete(&messages).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Completion failed: {}", e);
                    e.reply()
                }
            }
        };

        self.history.push(Turn::new(input_text, reply.as_str()));
        (self.history.as_slice(), reply)
    }

    pub fn clear(&mut self) {
        if !self.history.is_empty() {
            info!("Clearing {} turns", self.history.len());
        }
        self.history.clear();
    }
}
