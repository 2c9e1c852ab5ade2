//! Transcript state for a single visitor.

use serde::{Deserialize, Serialize};

use crate::documents::{self, UploadedDocumentRecord, UploadedFile};
use crate::error::AppError;
use crate::responder::ResponseGenerator;

/// Opening user line of every fresh transcript.
pub const SEED_USER_GREETING: &str = "Hello.";

/// Opening assistant line of every fresh transcript.
pub const SEED_ASSISTANT_GREETING: &str = "Hey. I'm a document grounded, question answering system. \
You can upload your documents, and ask questions, related to them.";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Typed by the visitor.
    User,
    /// Produced by the response generator.
    Assistant,
    /// Structured output shown verbatim, never recorded in history.
    Data,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    #[must_use]
    pub fn is_data(&self) -> bool {
        self.role == MessageRole::Data
    }
}

/// A question and the answer it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub question: String,
    pub answer: String,
}

/// Messages, derived history and upload widget contents for one session.
///
/// A default value is uninitialized (no messages); [`SessionState::initialize`]
/// seeds it with the greeting pair. Uploaded files belong to the upload
/// widget and survive a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    messages: Vec<ChatMessage>,
    history: Vec<ChatHistoryEntry>,
    uploads: Vec<UploadedFile>,
}

impl SessionState {
    /// Create a seeded state.
    #[must_use]
    pub fn seeded() -> Self {
        let mut state = Self::default();
        state.initialize();
        state
    }

    /// The fixed two-entry opening transcript.
    #[must_use]
    pub fn seed_messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(MessageRole::User, SEED_USER_GREETING),
            ChatMessage::new(MessageRole::Assistant, SEED_ASSISTANT_GREETING),
        ]
    }

    /// Seed the transcript if it has never been seeded. Idempotent.
    pub fn initialize(&mut self) {
        if self.messages.is_empty() {
            self.messages = Self::seed_messages();
            self.history.clear();
        }
    }

    /// Discard the transcript and history, then reseed.
    pub fn restart(&mut self) {
        self.messages.clear();
        self.history.clear();
        self.initialize();
    }

    /// Append a user message. Empty input is ignored.
    ///
    /// Returns `true` when a message was appended.
    pub fn submit_question(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::new(MessageRole::User, text));
        true
    }

    /// Push a message and record a history pair for non-data messages.
    ///
    /// The question of the pair is the message preceding the new one.
    pub fn append_message(&mut self, content: impl Into<String>, role: MessageRole) {
        let content = content.into();
        self.messages.push(ChatMessage::new(role, content.clone()));
        if role == MessageRole::Data {
            return;
        }
        let question = self
            .messages
            .len()
            .checked_sub(2)
            .map(|idx| self.messages[idx].content.clone());
        if let Some(question) = question {
            self.history.push(ChatHistoryEntry {
                question,
                answer: content,
            });
        }
    }

    /// Content awaiting an answer, if the last message is not from the assistant.
    #[must_use]
    pub fn pending_prompt(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role != MessageRole::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Answer the last message unless the assistant already spoke last.
    ///
    /// Returns `Ok(true)` if an answer was appended. On generator failure the
    /// transcript is left untouched.
    pub async fn respond_if_needed(
        &mut self,
        generator: &dyn ResponseGenerator,
    ) -> Result<bool, AppError> {
        let Some(prompt) = self.pending_prompt().map(str::to_owned) else {
            return Ok(false);
        };
        let answer = generator.generate(&prompt).await?;
        self.append_message(answer, MessageRole::Assistant);
        Ok(true)
    }

    /// Hand every message, in order, to a rendering function along with its
    /// `is_user` and `is_data` flags.
    pub fn render_transcript<T, F>(&self, mut render: F) -> Vec<T>
    where
        F: FnMut(&str, bool, bool) -> T,
    {
        self.messages
            .iter()
            .map(|m| render(&m.content, m.is_user(), m.is_data()))
            .collect()
    }

    /// Put files into the upload widget. A file with a name already held
    /// replaces the earlier one in place.
    pub fn add_uploads(&mut self, files: impl IntoIterator<Item = UploadedFile>) {
        for file in files {
            match self.uploads.iter_mut().find(|f| f.name == file.name) {
                Some(existing) => *existing = file,
                None => self.uploads.push(file),
            }
        }
    }

    /// Drop a file from the upload widget. Returns `true` if it was held.
    pub fn remove_upload(&mut self, name: &str) -> bool {
        let before = self.uploads.len();
        self.uploads.retain(|f| f.name != name);
        self.uploads.len() != before
    }

    #[must_use]
    pub fn uploads(&self) -> &[UploadedFile] {
        &self.uploads
    }

    /// Sidebar records for the files currently held, rebuilt on each call.
    #[must_use]
    pub fn documents(&self) -> Vec<UploadedDocumentRecord> {
        documents::list_documents(&self.uploads)
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn history(&self) -> &[ChatHistoryEntry] {
        &self.history
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
