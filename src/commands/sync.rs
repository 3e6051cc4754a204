//! Manual sync: export files and import them on another device

use serde::Serialize;

use crate::sync::{
    self, course_file_name, deck_file_name, export_course_share, export_profile,
    profile_file_name, ImportOutcome,
};
use crate::AppState;

use super::{lock, CommandError, CommandResult};

/// A file ready to be offered for download
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Import a profile backup, shared course or single deck file
pub fn import_file(state: &AppState, contents: String) -> CommandResult<ImportOutcome> {
    let mut store = lock(&state.store, "store")?;
    Ok(sync::import_json(&mut store, &contents)?)
}

/// Back up everything the signed-in user can see
pub fn export_profile_file(state: &AppState) -> CommandResult<ExportFile> {
    let store = lock(&state.store, "store")?;
    let user = store
        .current_user()
        .cloned()
        .ok_or_else(|| CommandError::validation("Sign in first"))?;

    let bundle = export_profile(&store, &user);
    Ok(ExportFile {
        file_name: profile_file_name(&user),
        contents: sync::to_json(&bundle)?,
    })
}

pub fn export_deck_file(state: &AppState, deck_id: String) -> CommandResult<ExportFile> {
    let store = lock(&state.store, "store")?;
    let deck = store
        .deck(&deck_id)
        .ok_or_else(|| CommandError::not_found("Deck", &deck_id))?;

    Ok(ExportFile {
        file_name: deck_file_name(deck),
        contents: sync::to_json(deck)?,
    })
}

/// Share a course together with its decks
pub fn export_course_file(state: &AppState, course_id: String) -> CommandResult<ExportFile> {
    let store = lock(&state.store, "store")?;
    let course = store
        .course(&course_id)
        .ok_or_else(|| CommandError::not_found("Course", &course_id))?;
    let exported_by = store.current_user().map(|u| u.name.clone());

    let bundle = export_course_share(&store, course, exported_by);
    Ok(ExportFile {
        file_name: course_file_name(course),
        contents: sync::to_json(&bundle)?,
    })
}
