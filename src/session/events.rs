//! Named UI events and the state transitions they cause.

use crate::documents::{self, UploadedFile};
use crate::error::AppError;

use super::SessionState;

/// Everything a visitor can do on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A question typed into the chat input.
    SubmitQuestion(String),
    /// Files accepted by the upload widget.
    UploadFiles(Vec<UploadedFile>),
    /// A file dropped from the upload widget.
    RemoveFile(String),
    /// The "Restart Chat" button.
    ClickRestart,
    /// The per-document open button.
    ClickDocument(String),
}

impl UiEvent {
    /// Short event name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitQuestion(_) => "submit_question",
            Self::UploadFiles(_) => "upload_files",
            Self::RemoveFile(_) => "remove_file",
            Self::ClickRestart => "click_restart",
            Self::ClickDocument(_) => "click_document",
        }
    }
}

/// Apply `event` to `state`, returning the next state.
///
/// Answering a submitted question is a separate, async step
/// ([`SessionState::respond_if_needed`]).
pub fn transition(mut state: SessionState, event: UiEvent) -> Result<SessionState, AppError> {
    match event {
        UiEvent::SubmitQuestion(text) => {
            state.submit_question(&text);
        }
        UiEvent::UploadFiles(files) => state.add_uploads(files),
        UiEvent::RemoveFile(name) => {
            state.remove_upload(&name);
        }
        UiEvent::ClickRestart => state.restart(),
        UiEvent::ClickDocument(name) => documents::open_document(&name)?,
    }
    Ok(state)
}
