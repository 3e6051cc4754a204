//! Courses and folders: groupings of deck references

use crate::courses::{Course, Folder};
use crate::AppState;

use super::{lock, require_text, require_user, CommandError, CommandResult};

// ==================== Courses ====================

/// Courses the signed-in user authored or joined
pub fn list_courses(state: &AppState) -> CommandResult<Vec<Course>> {
    let store = lock(&state.store, "store")?;
    Ok(store
        .current_user()
        .map(|u| store.courses_for(&u.id))
        .unwrap_or_default())
}

pub fn create_course(
    state: &AppState,
    name: String,
    description: Option<String>,
) -> CommandResult<Course> {
    let name = require_text(&name, "Course name")?;
    let user = require_user(state)?;

    let mut store = lock(&state.store, "store")?;
    store
        .create_course(&name, description.as_deref().unwrap_or_default(), user.id)
        .ok_or_else(|| CommandError::validation("Course name is required"))
}

pub fn delete_course(state: &AppState, course_id: String) -> CommandResult<()> {
    let mut store = lock(&state.store, "store")?;
    if !store.delete_course(&course_id) {
        return Err(CommandError::not_found("Course", &course_id));
    }
    Ok(())
}

/// Add a member by display name. Adding an existing member changes nothing.
pub fn add_course_member(
    state: &AppState,
    course_id: String,
    display_name: String,
) -> CommandResult<Course> {
    let display_name = require_text(&display_name, "Member name")?;
    let mut store = lock(&state.store, "store")?;
    store.add_member(&course_id, &display_name);
    store
        .course(&course_id)
        .cloned()
        .ok_or_else(|| CommandError::not_found("Course", &course_id))
}

pub fn add_deck_to_course(
    state: &AppState,
    course_id: String,
    deck_id: String,
) -> CommandResult<Course> {
    let mut store = lock(&state.store, "store")?;
    if store.deck(&deck_id).is_none() {
        return Err(CommandError::not_found("Deck", &deck_id));
    }
    store.add_deck_to_course(&course_id, &deck_id);
    store
        .course(&course_id)
        .cloned()
        .ok_or_else(|| CommandError::not_found("Course", &course_id))
}

pub fn remove_deck_from_course(
    state: &AppState,
    course_id: String,
    deck_id: String,
) -> CommandResult<Course> {
    let mut store = lock(&state.store, "store")?;
    store.remove_deck_from_course(&course_id, &deck_id);
    store
        .course(&course_id)
        .cloned()
        .ok_or_else(|| CommandError::not_found("Course", &course_id))
}

// ==================== Folders ====================

pub fn list_folders(state: &AppState) -> CommandResult<Vec<Folder>> {
    let store = lock(&state.store, "store")?;
    Ok(store
        .current_user()
        .map(|u| store.folders_for(&u.id))
        .unwrap_or_default())
}

pub fn create_folder(state: &AppState, name: String) -> CommandResult<Folder> {
    let name = require_text(&name, "Folder name")?;
    let user = require_user(state)?;

    let mut store = lock(&state.store, "store")?;
    store
        .create_folder(&name, user.id)
        .ok_or_else(|| CommandError::validation("Folder name is required"))
}

/// Rename a folder. A blank name leaves it unchanged.
pub fn rename_folder(state: &AppState, folder_id: String, name: String) -> CommandResult<Folder> {
    let mut store = lock(&state.store, "store")?;
    store.rename_folder(&folder_id, &name);
    store
        .folder(&folder_id)
        .cloned()
        .ok_or_else(|| CommandError::not_found("Folder", &folder_id))
}

pub fn delete_folder(state: &AppState, folder_id: String) -> CommandResult<()> {
    let mut store = lock(&state.store, "store")?;
    if !store.delete_folder(&folder_id) {
        return Err(CommandError::not_found("Folder", &folder_id));
    }
    Ok(())
}

pub fn add_deck_to_folder(
    state: &AppState,
    folder_id: String,
    deck_id: String,
) -> CommandResult<Folder> {
    let mut store = lock(&state.store, "store")?;
    if store.deck(&deck_id).is_none() {
        return Err(CommandError::not_found("Deck", &deck_id));
    }
    store.add_deck_to_folder(&folder_id, &deck_id);
    store
        .folder(&folder_id)
        .cloned()
        .ok_or_else(|| CommandError::not_found("Folder", &folder_id))
}

pub fn remove_deck_from_folder(
    state: &AppState,
    folder_id: String,
    deck_id: String,
) -> CommandResult<Folder> {
    let mut store = lock(&state.store, "store")?;
    store.remove_deck_from_folder(&folder_id, &deck_id);
    store
        .folder(&folder_id)
        .cloned()
        .ok_or_else(|| CommandError::not_found("Folder", &folder_id))
}
