use log::{debug, info};
use std::sync::Arc;

use crate::error::Result;
use crate::llm::backend::ModelBackend;
use crate::llm::prompts::{ASSISTANT_PERSONA, CHAT_FALLBACK_RESPONSE};
use crate::llm::types::{Content, GenerateRequest};
use crate::schema::{ConversationInput, Role};

pub const ASSISTANT_FLOW: &str = "askAssistant";

/// "Insight", the platform's chat assistant.
///
/// Stateless: the caller supplies the whole history on every turn.
#[derive(Clone)]
pub struct ConversationAssistant {
    backend: Arc<dyn ModelBackend>,
}

impl ConversationAssistant {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    /// Persona as system instruction, then history, then the new user message.
    ///
    /// A leading model turn is the dashboard's seeded greeting; the chat protocol
    /// requires the first turn to be user-authored, so it is dropped.
    pub fn build_request(input: &ConversationInput) -> GenerateRequest {
        let history = match input.history.first() {
            Some(first) if first.role == Role::Model => &input.history[1..],
            _ => &input.history[..],
        };

        let mut request = GenerateRequest::new(ASSISTANT_FLOW).system(ASSISTANT_PERSONA);
        for turn in history {
            request = request.content(Content::from(turn));
        }
        request.content(Content::user(input.message.clone()))
    }

    /// Never returns an empty reply; an empty model output becomes a fixed apology.
    pub async fn ask(&self, input: &ConversationInput) -> Result<String> {
        info!(
            "Assistant turn: {} prior messages",
            input.history.len()
        );

        let request = Self::build_request(input);
        let reply = self.backend.generate(request).await?;

        if reply.trim().is_empty() {
            debug!("Assistant returned no text; substituting fallback reply");
            return Ok(CHAT_FALLBACK_RESPONSE.to_string());
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::ASSISTANT_GREETING;
    use crate::schema::ConversationTurn;

    #[test]
    fn test_leading_greeting_is_dropped() {
        let input = ConversationInput {
            history: vec![ConversationTurn::model(ASSISTANT_GREETING)],
            message: "hello".to_string(),
        };
        let request = ConversationAssistant::build_request(&input);

        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role, Role::User);
        assert_eq!(request.contents[0].text(), "hello");
        assert_eq!(request.system_instruction.as_deref(), Some(ASSISTANT_PERSONA));
        assert!(!request.is_structured());
    }

    #[test]
    fn test_later_model_turns_are_kept() {
        let input = ConversationInput {
            history: vec![
                ConversationTurn::model(ASSISTANT_GREETING),
                ConversationTurn::user("What can you do?"),
                ConversationTurn::model("I can explain anomalies."),
            ],
            message: "Show me one".to_string(),
        };
        let request = ConversationAssistant::build_request(&input);

        let roles: Vec<Role> = request.contents.iter().map(|c| c.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Model, Role::User]);
        assert_eq!(request.contents[0].text(), "What can you do?");
        assert_eq!(request.contents[2].text(), "Show me one");
    }

    #[test]
    fn test_user_first_history_is_untouched() {
        let input = ConversationInput {
            history: vec![ConversationTurn::user("hi"), ConversationTurn::model("hello")],
            message: "forecast?".to_string(),
        };
        let request = ConversationAssistant::build_request(&input);
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].text(), "hi");
    }
}
