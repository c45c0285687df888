use crate::wellness::content::{ContentItem, ContentSource};
use crate::wellness::responder::Responder;
use crate::wellness::util::error_chain_text;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;

const CHAT_TIME_FORMAT: &str = "%H:%M";
const SEARCH_CONTEXT_HEADER: &str = "Background info from search:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "Therapist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingResponse,
}

/// User text followed by the search context block, one title per line.
pub fn compose_prompt(input: &str, context: &[ContentItem]) -> String {
    let lines = context
        .iter()
        .map(|item| item.title.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    format!("{input}\n\n{SEARCH_CONTEXT_HEADER}\n{lines}")
}

#[derive(Debug, Default)]
pub struct Conversation {
    history: Vec<ChatMessage>,
    state: TurnState,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    #[cfg(test)]
    pub fn state(&self) -> TurnState {
        self.state
    }

    pub(crate) fn clear(&mut self) {
        self.history.clear();
        self.state = TurnState::Idle;
    }

    pub fn send(
        &mut self,
        input: &str,
        search: &dyn ContentSource,
        search_limit: usize,
        responder: &dyn Responder,
    ) -> &ChatMessage {
        self.send_at(input, search, search_limit, responder, Local::now().naive_local())
    }

    /// One turn. Always appends the user message and then exactly one
    /// assistant message; both carry the turn's start time.
    pub fn send_at(
        &mut self,
        input: &str,
        search: &dyn ContentSource,
        search_limit: usize,
        responder: &dyn Responder,
        now: NaiveDateTime,
    ) -> &ChatMessage {
        let time = now.format(CHAT_TIME_FORMAT).to_string();
        self.history.push(ChatMessage {
            sender: Sender::User,
            text: input.to_string(),
            time: time.clone(),
        });
        self.state = TurnState::AwaitingResponse;
        tracing::debug!(turn = self.history.len(), state = ?self.state, "user message recorded");

        let context = search.fetch(input, search_limit).into_items();
        let prompt = compose_prompt(input, &context);
        let text = match responder.respond(&prompt) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    responder = responder.label(),
                    error = %error_chain_text(&err),
                    "responder failed"
                );
                format!("Sorry, I couldn't respond right now: {}", error_chain_text(&err))
            }
        };

        self.history.push(ChatMessage {
            sender: Sender::Assistant,
            text,
            time,
        });
        self.state = TurnState::Idle;
        tracing::debug!(turn = self.history.len(), state = ?self.state, "turn complete");
        &self.history[self.history.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::{Conversation, Sender, TurnState, compose_prompt};
    use crate::error::WellnessError;
    use crate::wellness::content::{ContentItem, ContentSource, SourceOutcome};
    use crate::wellness::responder::Responder;
    use anyhow::Result;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    struct Snippets(Vec<&'static str>);

    impl ContentSource for Snippets {
        fn name(&self) -> &'static str {
            "snippets"
        }

        fn fetch(&self, _query: &str, limit: usize) -> SourceOutcome {
            SourceOutcome::Live(self.0.iter().take(limit).map(|s| ContentItem::text(*s)).collect())
        }
    }

    struct NoSearch;

    impl ContentSource for NoSearch {
        fn name(&self) -> &'static str {
            "search"
        }

        fn fetch(&self, _query: &str, _limit: usize) -> SourceOutcome {
            SourceOutcome::degraded(
                "search",
                WellnessError::provider("search", "timed out"),
                "Search unavailable: timed out",
                1,
            )
        }
    }

    #[derive(Default)]
    struct Echo {
        prompts: RefCell<Vec<String>>,
    }

    impl Responder for Echo {
        fn label(&self) -> &str {
            "echo"
        }

        fn respond(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok("Let's try a slow breath together.".to_string())
        }
    }

    struct Offline;

    impl Responder for Offline {
        fn label(&self) -> &str {
            "offline"
        }

        fn respond(&self, _prompt: &str) -> Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    fn noon() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(12, 5, 0))
            .expect("valid time")
    }

    #[test]
    fn prompt_carries_search_titles_one_per_line() {
        let prompt = compose_prompt(
            "I feel anxious",
            &[ContentItem::text("Anxiety is common"), ContentItem::text("Breathing helps")],
        );
        assert_eq!(
            prompt,
            "I feel anxious\n\nBackground info from search:\nAnxiety is common\nBreathing helps"
        );
    }

    #[test]
    fn successful_turn_appends_user_then_assistant() {
        let mut convo = Conversation::new();
        let echo = Echo::default();
        let reply = convo
            .send_at("I feel anxious", &Snippets(vec!["Anxiety is common"]), 3, &echo, noon())
            .clone();
        assert_eq!(reply.sender, Sender::Assistant);
        assert_eq!(reply.text, "Let's try a slow breath together.");

        let history = convo.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[0].text, "I feel anxious");
        assert_eq!(history[0].time, "12:05");
        assert_eq!(history[1].time, "12:05");
        assert_eq!(convo.state(), TurnState::Idle);

        let prompts = echo.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("I feel anxious\n\nBackground info from search:\n"));
        assert!(prompts[0].ends_with("Anxiety is common"));
    }

    #[test]
    fn failures_still_append_exactly_two_messages() {
        let mut convo = Conversation::new();
        convo.send_at("hello", &NoSearch, 3, &Offline, noon());
        convo.send_at("again", &NoSearch, 3, &Offline, noon());

        let history = convo.history();
        assert_eq!(history.len(), 4);
        let senders: Vec<Sender> = history.iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::User, Sender::Assistant, Sender::User, Sender::Assistant]
        );
        assert!(history[1].text.contains("connection refused"));
    }

    #[test]
    fn degraded_search_text_still_reaches_the_responder() {
        let mut convo = Conversation::new();
        let echo = Echo::default();
        convo.send_at("hello", &NoSearch, 3, &echo, noon());
        assert!(echo.prompts.borrow()[0].ends_with("Search unavailable: timed out"));
    }
}
