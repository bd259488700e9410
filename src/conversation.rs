// Conversation buffer for multi-call strategies
//
// An ordered list of role-tagged messages sent as context on every
// completion call. Judging dialogues extend the buffer temporarily through
// `scoped_extend`, which always removes exactly what it appended.

use std::ops::{Deref, DerefMut};

use crate::providers::types::Message;

/// Ordered, append-only-by-default sequence of messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The conventional `[system, user]` opening used by every strategy
    pub fn with_system_and_user(system_prompt: &str, user: impl Into<String>) -> Self {
        let mut conv = Self::new();
        conv.push(Message::system(system_prompt));
        conv.push(Message::user(user));
        conv
    }

    /// Append a message to the end
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove the last `count` messages (all of them if fewer remain)
    pub fn truncate_last(&mut self, count: usize) {
        let keep = self.messages.len().saturating_sub(count);
        self.messages.truncate(keep);
    }

    /// Append `messages` for the lifetime of the returned guard.
    ///
    /// The guard derefs to this conversation, so it can be read (and even
    /// extended further) while held. Dropping it truncates back to the
    /// length before the call, on every exit path including `?` and unwinding.
    pub fn scoped_extend<I>(&mut self, messages: I) -> ScopedExtension<'_>
    where
        I: IntoIterator<Item = Message>,
    {
        let restore_len = self.messages.len();
        self.messages.extend(messages);
        ScopedExtension {
            conversation: self,
            restore_len,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Owned copy of the messages, for building a request
    pub fn to_messages(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Temporary extension of a [`Conversation`]; see [`Conversation::scoped_extend`]
#[derive(Debug)]
pub struct ScopedExtension<'a> {
    conversation: &'a mut Conversation,
    restore_len: usize,
}

impl ScopedExtension<'_> {
    /// Number of messages this scope has added so far
    pub fn added(&self) -> usize {
        self.conversation.len().saturating_sub(self.restore_len)
    }
}

impl Deref for ScopedExtension<'_> {
    type Target = Conversation;

    fn deref(&self) -> &Conversation {
        self.conversation
    }
}

impl DerefMut for ScopedExtension<'_> {
    fn deref_mut(&mut self) -> &mut Conversation {
        self.conversation
    }
}

impl Drop for ScopedExtension<'_> {
    fn drop(&mut self) {
        self.conversation.messages.truncate(self.restore_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::Role;

    #[test]
    fn test_conversation_creation() {
        let conv = Conversation::new();
        assert!(conv.is_empty());
        assert_eq!(conv.len(), 0);
    }

    #[test]
    fn test_system_and_user_opening() {
        let conv = Conversation::with_system_and_user("be brief", "What is 2+2?");
        let messages = conv.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "be brief");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "What is 2+2?");
    }

    #[test]
    fn test_truncate_last() {
        let mut conv = Conversation::with_system_and_user("s", "u");
        conv.push(Message::assistant("a"));
        conv.truncate_last(2);
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.messages()[0].role, Role::System);
    }

    #[test]
    fn test_truncate_last_saturates() {
        let mut conv = Conversation::with_system_and_user("s", "u");
        conv.truncate_last(10);
        assert!(conv.is_empty());
    }

    #[test]
    fn test_scoped_extend_restores_length() {
        let mut conv = Conversation::with_system_and_user("s", "u");
        {
            let scoped =
                conv.scoped_extend([Message::assistant("candidate"), Message::user("rate it")]);
            assert_eq!(scoped.len(), 4);
            assert_eq!(scoped.added(), 2);
            assert_eq!(scoped.messages()[2].content, "candidate");
        }
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[1].content, "u");
    }

    #[test]
    fn test_scoped_extend_restores_on_error_path() {
        fn judge(conv: &mut Conversation) -> Result<(), String> {
            let _scoped = conv.scoped_extend([Message::assistant("x"), Message::user("y")]);
            let outcome: Result<(), String> = Err("service failed".to_string());
            outcome?;
            Ok(())
        }

        let mut conv = Conversation::with_system_and_user("s", "u");
        assert!(judge(&mut conv).is_err());
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn test_scoped_extend_removes_later_pushes_too() {
        let mut conv = Conversation::with_system_and_user("s", "u");
        {
            let mut scoped = conv.scoped_extend([Message::assistant("a")]);
            scoped.push(Message::user("extra"));
            assert_eq!(scoped.added(), 2);
        }
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn test_repeated_scopes_are_symmetric() {
        let mut conv = Conversation::with_system_and_user("s", "u");
        conv.push(Message::system("rubric"));
        let before = conv.len();
        for i in 0..5 {
            let scoped = conv.scoped_extend([
                Message::assistant(format!("candidate {}", i)),
                Message::user("Rate the above response:"),
            ]);
            assert_eq!(scoped.len(), before + 2);
            drop(scoped);
            assert_eq!(conv.len(), before);
        }
    }
}
