//! Ordered conversation history.
//!
//! Turns for one user request are appended through an [`Exchange`]. An
//! exchange that is dropped without [`Exchange::commit`] removes the turns it
//! appended, so a failed request never leaves partial history behind.

use serde::Serialize;

use super::turn::{Turn, TurnContent};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    turns: Vec<Turn>,
    #[serde(skip)]
    max_turns: Option<usize>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max` turns after each committed exchange.
    ///
    /// Trimming always restarts history at a user text turn, so a tool
    /// invocation is never separated from its result.
    pub fn with_max_turns(max: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: Some(max.max(1)),
        }
    }

    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Start a new exchange with the given user text.
    pub fn begin(&mut self, user_text: impl Into<String>) -> Exchange<'_> {
        let start = self.turns.len();
        self.turns.push(Turn::user(user_text));
        Exchange {
            conversation: self,
            start,
            committed: false,
        }
    }

    /// Every invocation is immediately followed by one result for the same tool,
    /// and every result answers the invocation right before it.
    pub fn is_well_paired(&self) -> bool {
        let mut pending: Option<&str> = None;
        for turn in &self.turns {
            match (&turn.content, pending) {
                (TurnContent::Invocation { invocation }, None) => {
                    pending = Some(invocation.name.as_str())
                }
                (TurnContent::Result { result }, Some(name)) if result.name == name => {
                    pending = None
                }
                (TurnContent::Text { .. }, None) => {}
                _ => return false,
            }
        }
        pending.is_none()
    }

    fn enforce_limit(&mut self) {
        let Some(max) = self.max_turns else {
            return;
        };
        let len = self.turns.len();
        if len <= max {
            return;
        }

        let cut = (len - max..len)
            .find(|&i| self.turns[i].is_user_text())
            .or_else(|| self.turns.iter().rposition(Turn::is_user_text))
            .unwrap_or(0);
        self.turns.drain(..cut);
    }
}

/// Turns appended on behalf of one in-flight user request.
#[derive(Debug)]
pub struct Exchange<'a> {
    conversation: &'a mut Conversation,
    start: usize,
    committed: bool,
}

impl<'a> Exchange<'a> {
    pub fn push(&mut self, turn: Turn) {
        self.conversation.turns.push(turn);
    }

    /// Full history as it should be sent to the model, pending turns included.
    pub fn history(&self) -> &[Turn] {
        &self.conversation.turns
    }

    /// Turns appended by this exchange, starting with the user turn.
    pub fn appended(&self) -> &[Turn] {
        &self.conversation.turns[self.start..]
    }

    /// Keep the appended turns and apply the history limit.
    pub fn commit(mut self) {
        self.committed = true;
        self.conversation.enforce_limit();
    }
}

impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.conversation.turns.truncate(self.start);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tool::{ToolInvocation, ToolResult};
    use serde_json::json;

    fn tool_round(exchange: &mut Exchange<'_>, name: &str) {
        let inv = ToolInvocation::new(name, json!({}));
        let result = ToolResult::success(&inv, json!({"ok": true}));
        exchange.push(Turn::invocation(inv));
        exchange.push(Turn::tool_result(result));
    }

    #[test]
    fn test_commit_keeps_turns() {
        let mut conv = Conversation::new();
        let mut ex = conv.begin("hello");
        tool_round(&mut ex, "get_current_location");
        ex.push(Turn::assistant("You are in Auckland."));
        assert_eq!(ex.appended().len(), 4);
        ex.commit();

        assert_eq!(conv.len(), 4);
        assert!(conv.is_well_paired());
        assert_eq!(conv.last().and_then(Turn::text), Some("You are in Auckland."));
    }

    #[test]
    fn test_dropped_exchange_rolls_back() {
        let mut conv = Conversation::new();
        conv.begin("first").commit();
        {
            let mut ex = conv.begin("second");
            tool_round(&mut ex, "get_weather");
            assert_eq!(ex.history().len(), 4);
        }
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.turns()[0].text(), Some("first"));
    }

    #[test]
    fn test_limit_never_splits_pairs() {
        let mut conv = Conversation::with_max_turns(5);
        let mut ex = conv.begin("one");
        ex.push(Turn::assistant("reply one"));
        ex.commit();

        let mut ex = conv.begin("two");
        tool_round(&mut ex, "get_weather");
        ex.push(Turn::assistant("reply two"));
        ex.commit();

        // 6 turns, limit 5: "reply one" would lead, so trimming advances to "two".
        assert_eq!(conv.len(), 4);
        assert_eq!(conv.turns()[0].text(), Some("two"));
        assert!(conv.is_well_paired());
    }

    #[test]
    fn test_limit_keeps_oversized_latest_exchange() {
        let mut conv = Conversation::with_max_turns(2);
        let mut ex = conv.begin("weather here?");
        tool_round(&mut ex, "get_current_location");
        tool_round(&mut ex, "get_weather");
        ex.push(Turn::assistant("Sunny."));
        ex.commit();

        assert_eq!(conv.len(), 6);
        assert!(conv.turns()[0].is_user_text());
    }

    #[test]
    fn test_detects_unpaired_invocation() {
        let mut conv = Conversation::new();
        let mut ex = conv.begin("hi");
        ex.push(Turn::invocation(ToolInvocation::new("get_weather", json!({}))));
        ex.push(Turn::assistant("oops"));
        ex.commit();
        assert!(!conv.is_well_paired());
    }
}
