use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Local-first message lifecycle: a question is appended as `Pending`
/// before the network round trip and reconciled to `Committed` or `Failed`
/// when the response lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Committed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub status: MessageStatus,
}

/// The chat thread: an ordered, append-only sequence of messages, held only
/// in memory and cleared whenever the selected document changes.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Optimistically appends the user's question before the network call.
    pub fn push_pending_user(&mut self, text: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.messages.push(Message {
            id,
            text: text.to_string(),
            sender: Sender::User,
            status: MessageStatus::Pending,
        });
        id
    }

    /// Reconciliation on success: the pending question becomes committed and
    /// the bot's reply is appended after it.
    pub fn commit_answer(&mut self, id: Uuid, answer: &str) {
        self.set_status(id, MessageStatus::Committed);
        self.messages.push(Message {
            id: Uuid::new_v4(),
            text: answer.to_string(),
            sender: Sender::Bot,
            status: MessageStatus::Committed,
        });
    }

    /// Reconciliation on failure: the question stays visible, marked failed,
    /// and no reply is appended.
    pub fn mark_failed(&mut self, id: Uuid) {
        self.set_status(id, MessageStatus::Failed);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn set_status(&mut self, id: Uuid, status: MessageStatus) {
        if let Some(message) = self.messages.iter_mut().find(|message| message.id == id) {
            message.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_ask_commits_question_and_appends_reply() {
        let mut conversation = Conversation::new();
        let id = conversation.push_pending_user("what is this?");
        assert_eq!(conversation.messages()[0].status, MessageStatus::Pending);

        conversation.commit_answer(id, "a PDF");

        let messages = conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].status, MessageStatus::Committed);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].text, "a PDF");
    }

    #[test]
    fn failed_ask_keeps_question_without_reply() {
        let mut conversation = Conversation::new();
        conversation.push_pending_user("first");
        let id = conversation.push_pending_user("second");

        conversation.mark_failed(id);

        let messages = conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].status, MessageStatus::Failed);
        // Earlier messages are untouched
        assert_eq!(messages[0].status, MessageStatus::Pending);
    }

    #[test]
    fn clear_empties_the_thread() {
        let mut conversation = Conversation::new();
        let id = conversation.push_pending_user("hello");
        conversation.commit_answer(id, "hi");

        conversation.clear();
        assert!(conversation.is_empty());
    }
}
