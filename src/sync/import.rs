//! Applying a decoded bundle to the entity store

use std::sync::Arc;

use serde::Serialize;

use crate::flashcards::{new_id, Deck};
use crate::profile::{HistoryAction, HistoryEntry, User};
use crate::store::EntityStore;

use super::bundle::{
    FullProfileBundle, ImportBundle, ImportError, Result, SharedCourseBundle,
};
use super::merge::{merge_into, BundleData, MergeReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportKind {
    FullProfile,
    SharedCourse,
    SingleDeck,
}

/// Result of an import, for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub kind: ImportKind,
    pub report: MergeReport,
    /// Set when a backup was imported with nobody signed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<String>,
}

/// Parse an import file and merge it into the store
pub fn import_json(store: &mut EntityStore, json: &str) -> Result<ImportOutcome> {
    let bundle = ImportBundle::parse(json)?;
    import_bundle(store, bundle)
}

pub fn import_bundle(store: &mut EntityStore, bundle: ImportBundle) -> Result<ImportOutcome> {
    let kind = bundle.kind();
    let outcome = match bundle {
        ImportBundle::FullProfile(bundle) => import_full_profile(store, bundle),
        ImportBundle::SharedCourse(bundle) => import_shared_course(store, bundle)?,
        ImportBundle::SingleDeck(deck) => import_single_deck(store, deck)?,
    };

    log::info!(
        "Imported {}: {} decks added, {} skipped, {} courses added, {} replaced",
        kind,
        outcome.report.decks_added,
        outcome.report.decks_skipped,
        outcome.report.courses_added,
        outcome.report.courses_replaced
    );
    Ok(outcome)
}

/// Merge a backup. With nobody signed in, the bundled user becomes active.
fn import_full_profile(store: &mut EntityStore, bundle: FullProfileBundle) -> ImportOutcome {
    let restored_user = if store.current_user().is_none() {
        bundle.user
    } else {
        None
    };
    if let Some(user) = &restored_user {
        store.set_current_user(user.clone());
    }

    let data = BundleData {
        decks: bundle.decks,
        courses: bundle.courses,
        folders: bundle.folders,
        history: bundle.history,
    };
    let (next, report) = merge_into(&store.snapshot(), data);
    store.replace(next);

    ImportOutcome {
        kind: ImportKind::FullProfile,
        report,
        restored_user,
        course_id: None,
        deck_id: None,
    }
}

/// Accept a shared course. The importer joins it if not already involved.
fn import_shared_course(
    store: &mut EntityStore,
    bundle: SharedCourseBundle,
) -> Result<ImportOutcome> {
    let user = store
        .current_user()
        .cloned()
        .ok_or(ImportError::NoActiveUser("course share"))?;

    let mut course = bundle.course;
    if course.author_id != user.id && !course.member_ids.contains(&user.id) {
        course.member_ids.push(user.id.clone());
    }
    let course_id = course.id.clone();

    let data = BundleData {
        decks: bundle.decks,
        courses: vec![course],
        ..Default::default()
    };
    let (mut next, report) = merge_into(&store.snapshot(), data);

    if !report.added_deck_ids.is_empty() {
        let mut history = next.history.as_ref().clone();
        history.extend(
            next.decks
                .iter()
                .filter(|d| report.added_deck_ids.contains(&d.id))
                .map(|d| HistoryEntry::new(user.id.clone(), d, HistoryAction::Imported)),
        );
        next.history = Arc::new(history);
    }
    store.replace(next);

    Ok(ImportOutcome {
        kind: ImportKind::SharedCourse,
        report,
        restored_user: None,
        course_id: Some(course_id),
        deck_id: None,
    })
}

/// Add an exported deck to the active user's library.
///
/// The deck is re-authored to the importer and gets a fresh id when its id
/// is already taken, so importing the same file twice yields two decks.
fn import_single_deck(store: &mut EntityStore, mut deck: Deck) -> Result<ImportOutcome> {
    let user = store
        .current_user()
        .cloned()
        .ok_or(ImportError::NoActiveUser("deck"))?;

    if store.deck(&deck.id).is_some() {
        deck.id = new_id();
    }
    deck.author_id = user.id.clone();
    let deck_id = deck.id.clone();

    let data = BundleData {
        decks: vec![deck],
        ..Default::default()
    };
    let (next, report) = merge_into(&store.snapshot(), data);
    store.replace(next);

    if let Some(deck) = store.deck(&deck_id).cloned() {
        store.record_history(user.id, &deck, HistoryAction::Imported);
    }

    Ok(ImportOutcome {
        kind: ImportKind::SingleDeck,
        report,
        restored_user: None,
        course_id: None,
        deck_id: Some(deck_id),
    })
}
