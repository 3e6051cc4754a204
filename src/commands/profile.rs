use crate::profile::{HistoryEntry, Theme, User};
use crate::storage::{load_json_or_default, persist, StorageKey};
use crate::AppState;

use super::{lock, CommandError, CommandResult};

pub fn current_user(state: &AppState) -> CommandResult<Option<User>> {
    let store = lock(&state.store, "store")?;
    Ok(store.current_user().cloned())
}

/// Sign in under a display name. No password is involved.
pub fn login(state: &AppState, display_name: String) -> CommandResult<User> {
    let mut store = lock(&state.store, "store")?;
    store
        .login(&display_name)
        .ok_or_else(|| CommandError::validation("Name is required"))
}

pub fn logout(state: &AppState) -> CommandResult<()> {
    let mut store = lock(&state.store, "store")?;
    store.logout();
    Ok(())
}

/// The signed-in user's history, newest first
pub fn list_history(state: &AppState) -> CommandResult<Vec<HistoryEntry>> {
    let store = lock(&state.store, "store")?;
    Ok(store
        .current_user()
        .map(|u| store.history_for(&u.id))
        .unwrap_or_default())
}

pub fn get_theme(state: &AppState) -> Theme {
    load_json_or_default(state.kv.as_ref(), &StorageKey::Theme)
}

pub fn set_theme(state: &AppState, theme: Theme) -> Theme {
    persist(state.kv.as_ref(), &StorageKey::Theme, &theme);
    theme
}

pub fn toggle_theme(state: &AppState) -> Theme {
    set_theme(state, get_theme(state).toggled())
}
