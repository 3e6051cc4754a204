//! Application commands invoked by the view layer
//!
//! Every command takes the shared [`AppState`](crate::AppState) and returns a
//! [`CommandResult`]. Errors are flattened into a serializable
//! [`CommandError`] whose `kind` tells the view how to surface it.

mod assistant;
mod deck;
mod library;
mod profile;
mod study;
mod sync;

#[cfg(test)]
mod test_support;

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::assistant::AssistantError;
use crate::profile::User;
use crate::storage::StorageError;
use crate::sync::ImportError;
use crate::AppState;

pub use assistant::*;
pub use deck::*;
pub use library::*;
pub use profile::*;
pub use study::*;
pub use sync::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandErrorKind {
    /// A required field is empty or nobody is signed in; shown inline
    Validation,
    /// The import file could not be understood; nothing was merged
    ImportFormat,
    /// The assistant failed; the user may retry
    ExternalService,
    Storage,
    NotFound,
    /// Another generation is still running
    Busy,
}

#[derive(Debug, Serialize)]
pub struct CommandError {
    pub kind: CommandErrorKind,
    pub message: String,
}

impl CommandError {
    pub fn new(kind: CommandErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CommandErrorKind::Validation, message)
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        Self::new(CommandErrorKind::NotFound, format!("{} not found: {}", what, id))
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<StorageError> for CommandError {
    fn from(err: StorageError) -> Self {
        Self::new(CommandErrorKind::Storage, err.to_string())
    }
}

impl From<ImportError> for CommandError {
    fn from(err: ImportError) -> Self {
        let kind = match err {
            ImportError::NoActiveUser(_) => CommandErrorKind::Validation,
            _ => CommandErrorKind::ImportFormat,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<AssistantError> for CommandError {
    fn from(err: AssistantError) -> Self {
        Self::new(CommandErrorKind::ExternalService, err.to_string())
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> CommandResult<MutexGuard<'a, T>> {
    mutex.lock().map_err(|e| {
        CommandError::new(
            CommandErrorKind::Storage,
            format!("Failed to acquire {} lock: {}", what, e),
        )
    })
}

/// The signed-in user, or a validation error asking to sign in
fn require_user(state: &AppState) -> CommandResult<User> {
    let store = lock(&state.store, "store")?;
    store
        .current_user()
        .cloned()
        .ok_or_else(|| CommandError::validation("Sign in first"))
}

fn require_text(value: &str, field: &str) -> CommandResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CommandError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
