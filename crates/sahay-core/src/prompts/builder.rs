//! Prompt builder: registry instruction + profile fields + task text (+ history) → payload.

use crate::history::ConversationHistory;
use crate::language::Language;
use crate::prompts::registry::{system_prompt, PromptKind};
use serde::{Deserialize, Serialize};

/// One role-tagged message of an OpenAI-compatible chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A composed request, ready for the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptPayload {
    /// Registry family the instruction came from; `None` for free-form instructions
    /// (translation, RAG roles).
    pub kind: Option<PromptKind>,
    pub language: Language,
    pub messages: Vec<ChatMessage>,
}

impl PromptPayload {
    /// All message contents joined, for logging and assertions.
    pub fn text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    System,
    User,
}

/// Accumulates prompt sections in order; sections are separated by a blank line.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    kind: Option<PromptKind>,
    language: Language,
    sections: Vec<String>,
    role: Role,
}

impl PromptBuilder {
    /// Start with the registry instruction for `(language, kind)`.
    pub fn new(kind: PromptKind, language: Language) -> Self {
        Self {
            kind: Some(kind),
            language,
            sections: vec![system_prompt(language, kind).to_string()],
            role: Role::System,
        }
    }

    /// Start with a caller-supplied instruction instead of a registry entry.
    pub fn with_instruction(language: Language, instruction: impl Into<String>) -> Self {
        Self {
            kind: None,
            language,
            sections: vec![instruction.into()],
            role: Role::System,
        }
    }

    /// Send the composed prompt as a user message instead of a system message.
    pub fn as_user_message(mut self) -> Self {
        self.role = Role::User;
        self
    }

    /// Free text section. Blank text is skipped.
    pub fn section(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.sections.push(text);
        }
        self
    }

    /// `title:` followed by one `- label: value` line per field. Empty values are kept so the
    /// prompt shape does not depend on which fields the caller knows.
    pub fn fields(mut self, title: &str, fields: &[(&str, &str)]) -> Self {
        let mut block = format!("{}:", title);
        for (label, value) in fields {
            block.push_str(&format!("\n- {}: {}", label, value));
        }
        self.sections.push(block);
        self
    }

    /// `title: <pretty JSON>`.
    pub fn json(mut self, title: &str, value: &serde_json::Value) -> Self {
        let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        self.sections.push(format!("{}: {}", title, rendered));
        self
    }

    /// `title:` followed by the most recent `exchanges`, each response cut to `budget` chars.
    pub fn history(
        mut self,
        title: &str,
        history: &ConversationHistory,
        exchanges: usize,
        budget: usize,
    ) -> Self {
        self.sections
            .push(format!("{}:\n{}", title, history.excerpt(exchanges, budget)));
        self
    }

    /// Structured-output instruction: the model must return only JSON of this shape.
    pub fn output_schema(mut self, schema: &str) -> Self {
        self.sections
            .push(format!("Return ONLY valid JSON with this structure:\n{}", schema));
        self
    }

    pub fn build(self) -> PromptPayload {
        let content = self.sections.join("\n\n");
        let message = match self.role {
            Role::System => ChatMessage::system(content),
            Role::User => ChatMessage::user(content),
        };
        PromptPayload {
            kind: self.kind,
            language: self.language,
            messages: vec![message],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::registry::HI_CREDIT;

    #[test]
    fn registry_instruction_comes_first() {
        let payload = PromptBuilder::new(PromptKind::Credit, Language::Hindi)
            .section("Explain the score.")
            .build();
        assert_eq!(payload.messages.len(), 1);
        assert_eq!(payload.messages[0].role, "system");
        assert!(payload.messages[0].content.starts_with(HI_CREDIT));
        assert!(payload.messages[0].content.ends_with("Explain the score."));
    }

    #[test]
    fn empty_profile_fields_keep_their_labels() {
        let payload = PromptBuilder::new(PromptKind::Educational, Language::English)
            .fields("User Profile", &[("Name", ""), ("Occupation", "farmer")])
            .build();
        let text = payload.text();
        assert!(text.contains("User Profile:\n- Name: \n- Occupation: farmer"));
    }

    #[test]
    fn user_role_and_free_instruction() {
        let payload = PromptBuilder::with_instruction(Language::English, "You translate.")
            .as_user_message()
            .build();
        assert_eq!(payload.kind, None);
        assert_eq!(payload.messages[0].role, "user");
    }

    #[test]
    fn history_section_renders_excerpt() {
        let mut history = ConversationHistory::new(10);
        history.record("q1", "a".repeat(300), Language::English);
        let payload = PromptBuilder::new(PromptKind::Voice, Language::English)
            .history("RECENT CONVERSATION HISTORY", &history, 3, 200)
            .build();
        let text = payload.text();
        assert!(text.contains("RECENT CONVERSATION HISTORY:\nUser: q1"));
        assert!(!text.contains(&"a".repeat(201)));
    }
}
