//! Session context threaded through plugin execution
//!
//! The surrounding assistant owns this value; the registry passes it
//! through to plugins unmodified and never stores or inspects it.

/// Execution-scoped context for a single tool call
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Conversation/chat identifier in the surrounding application
    pub chat_id: Option<i64>,
    /// Display name of the requesting user, for attribution
    pub user: Option<String>,
}

impl SessionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chat identifier
    pub fn with_chat_id(mut self, chat_id: i64) -> Self {
        self.chat_id = Some(chat_id);
        self
    }

    /// Set the requesting user
    pub fn with_user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let ctx = SessionContext::new().with_chat_id(42).with_user("alice");
        assert_eq!(ctx.chat_id, Some(42));
        assert_eq!(ctx.user.as_deref(), Some("alice"));
    }
}
