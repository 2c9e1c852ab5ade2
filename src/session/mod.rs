//! Per-visitor chat sessions.
//!
//! Each browser visit owns one [`Session`]: a transcript of chat messages,
//! the question/answer history derived from it, and the files currently held
//! by the upload widget. Sessions are isolated from each other and live in
//! memory only.
//!
//! # Architecture
//!
//! - [`SessionState`]: transcript value with its lifecycle (seed, restart, submit, respond)
//! - [`UiEvent`] and [`transition`]: named page events mapped to state transitions
//! - [`Session`]: shared, lock-guarded handle to one state
//! - [`SessionStore`]: thread-safe map of all active sessions
//!
//! # Example
//!
//! ```rust
//! use mhdqa_gui::session::{SessionStore, UiEvent};
//!
//! let store = SessionStore::new();
//! let session = store.create();
//! session.dispatch(UiEvent::SubmitQuestion("What is credit risk?".into())).unwrap();
//!
//! assert_eq!(session.snapshot().messages().len(), 3);
//! ```

mod events;
mod state;
mod store;

pub use events::{UiEvent, transition};
pub use state::{
    ChatHistoryEntry, ChatMessage, MessageRole, SEED_ASSISTANT_GREETING, SEED_USER_GREETING,
    SessionState,
};
pub use store::{DEFAULT_SESSION_TIMEOUT, Session, SessionStore};
