//! Reconciliation of imported records with the local collections
//!
//! Decks, folders and history are additive: an incoming record whose id is
//! already known locally is dropped, so re-importing a bundle changes nothing.
//! Courses are overwritten: an incoming course replaces the local record with
//! the same id wholesale, so the last import wins.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::courses::{Course, Folder};
use crate::flashcards::Deck;
use crate::profile::HistoryEntry;
use crate::store::{Collections, Identified};

/// Records taken from a bundle, ready to merge
#[derive(Debug, Clone, Default)]
pub struct BundleData {
    pub decks: Vec<Deck>,
    pub courses: Vec<Course>,
    pub folders: Vec<Folder>,
    pub history: Vec<HistoryEntry>,
}

/// What a merge did to each collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub decks_added: usize,
    pub decks_skipped: usize,
    pub courses_added: usize,
    pub courses_replaced: usize,
    pub folders_added: usize,
    pub folders_skipped: usize,
    pub history_added: usize,
    pub history_skipped: usize,
    pub references_pruned: usize,
    /// Ids of decks that were new to the local store
    pub added_deck_ids: Vec<String>,
}

/// Append incoming records whose id is not yet present (local wins).
///
/// Returns the local `Arc` unchanged when nothing was added.
fn merge_keep_local<T: Identified + Clone>(
    local: &Arc<Vec<T>>,
    incoming: Vec<T>,
) -> (Arc<Vec<T>>, Vec<String>, usize) {
    let mut seen: HashSet<String> = local.iter().map(|r| r.id().to_string()).collect();
    let mut appended = Vec::new();
    let mut skipped = 0;

    for record in incoming {
        if seen.insert(record.id().to_string()) {
            appended.push(record);
        } else {
            skipped += 1;
        }
    }

    if appended.is_empty() {
        return (Arc::clone(local), Vec::new(), skipped);
    }

    let added_ids = appended.iter().map(|r| r.id().to_string()).collect();
    let mut merged = local.as_ref().clone();
    merged.extend(appended);
    (Arc::new(merged), added_ids, skipped)
}

/// Replace records with a matching id in place, append the rest (incoming wins)
fn merge_replace<T: Identified + Clone>(
    local: &Arc<Vec<T>>,
    incoming: Vec<T>,
) -> (Arc<Vec<T>>, usize, usize) {
    if incoming.is_empty() {
        return (Arc::clone(local), 0, 0);
    }

    let mut merged = local.as_ref().clone();
    let mut added = 0;
    let mut replaced = 0;

    for record in incoming {
        match merged.iter().position(|r| r.id() == record.id()) {
            Some(index) => {
                merged[index] = record;
                replaced += 1;
            }
            None => {
                merged.push(record);
                added += 1;
            }
        }
    }

    (Arc::new(merged), added, replaced)
}

/// Merge bundle records into a snapshot, returning the next snapshot.
///
/// Course and folder references to decks that exist neither locally nor in
/// the bundle are pruned afterwards.
pub fn merge_into(current: &Collections, data: BundleData) -> (Collections, MergeReport) {
    let (decks, added_deck_ids, decks_skipped) = merge_keep_local(&current.decks, data.decks);
    let (courses, courses_added, courses_replaced) = merge_replace(&current.courses, data.courses);
    let (folders, added_folders, folders_skipped) =
        merge_keep_local(&current.folders, data.folders);
    let (history, added_history, history_skipped) =
        merge_keep_local(&current.history, data.history);

    let mut next = Collections {
        decks,
        courses,
        folders,
        history,
    };
    let references_pruned = next.prune_dangling_references();

    let report = MergeReport {
        decks_added: added_deck_ids.len(),
        decks_skipped,
        courses_added,
        courses_replaced,
        folders_added: added_folders.len(),
        folders_skipped,
        history_added: added_history.len(),
        history_skipped,
        references_pruned,
        added_deck_ids,
    };

    (next, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::HistoryAction;

    fn deck(id: &str, name: &str) -> Deck {
        let mut deck = Deck::new(name.to_string(), "anna".to_string());
        deck.id = id.to_string();
        deck
    }

    fn course(id: &str, name: &str, deck_ids: &[&str]) -> Course {
        let mut course = Course::new(name.to_string(), String::new(), "anna".to_string());
        course.id = id.to_string();
        course.deck_ids = deck_ids.iter().map(|d| d.to_string()).collect();
        course
    }

    fn bundle() -> BundleData {
        let d1 = deck("d1", "Verbs");
        let mut folder = Folder::new("Languages".to_string(), "anna".to_string());
        folder.id = "f1".to_string();
        folder.deck_ids = vec!["d1".to_string()];
        let mut entry = HistoryEntry::new("anna".to_string(), &d1, HistoryAction::Created);
        entry.id = "h1".to_string();

        BundleData {
            decks: vec![d1, deck("d2", "Nouns")],
            courses: vec![course("k1", "B1", &["d1", "d2"])],
            folders: vec![folder],
            history: vec![entry],
        }
    }

    #[test]
    fn test_merge_into_empty() {
        let (next, report) = merge_into(&Collections::default(), bundle());

        assert_eq!(next.decks.len(), 2);
        assert_eq!(next.courses.len(), 1);
        assert_eq!(next.folders.len(), 1);
        assert_eq!(next.history.len(), 1);
        assert_eq!(report.decks_added, 2);
        assert_eq!(report.courses_added, 1);
        assert_eq!(report.added_deck_ids, vec!["d1".to_string(), "d2".to_string()]);
        assert_eq!(report.references_pruned, 0);
    }

    #[test]
    fn test_merge_is_idempotent_for_additive_collections() {
        let (once, _) = merge_into(&Collections::default(), bundle());
        let (twice, report) = merge_into(&once, bundle());

        assert!(Arc::ptr_eq(&once.decks, &twice.decks));
        assert!(Arc::ptr_eq(&once.folders, &twice.folders));
        assert!(Arc::ptr_eq(&once.history, &twice.history));
        assert_eq!(
            serde_json::to_string(once.decks.as_ref()).unwrap(),
            serde_json::to_string(twice.decks.as_ref()).unwrap()
        );
        assert_eq!(report.decks_added, 0);
        assert_eq!(report.decks_skipped, 2);
        assert_eq!(report.folders_skipped, 1);
        assert_eq!(report.history_skipped, 1);
        assert_eq!(report.courses_replaced, 1);
    }

    #[test]
    fn test_local_deck_wins_over_incoming() {
        let local = Collections {
            decks: Arc::new(vec![deck("d1", "Local edit")]),
            ..Default::default()
        };

        let (next, _) = merge_into(&local, bundle());
        let d1 = next.decks.iter().find(|d| d.id == "d1").unwrap();
        assert_eq!(d1.name, "Local edit");
    }

    #[test]
    fn test_incoming_course_overwrites_local() {
        // Both devices edited course k1; the imported copy silently replaces
        // the local one, including its member list.
        let mut local_course = course("k1", "Local name", &["d1"]);
        local_course.member_ids = vec!["max".to_string()];
        let local = Collections {
            decks: Arc::new(vec![deck("d1", "Verbs")]),
            courses: Arc::new(vec![local_course]),
            ..Default::default()
        };

        let (next, report) = merge_into(&local, bundle());

        assert_eq!(next.courses.len(), 1);
        assert_eq!(next.courses[0].name, "B1");
        assert!(next.courses[0].member_ids.is_empty());
        assert_eq!(report.courses_replaced, 1);
        assert_eq!(report.courses_added, 0);
    }

    #[test]
    fn test_duplicate_ids_within_bundle() {
        let data = BundleData {
            decks: vec![deck("d1", "First"), deck("d1", "Second")],
            ..Default::default()
        };

        let (next, report) = merge_into(&Collections::default(), data);
        assert_eq!(next.decks.len(), 1);
        assert_eq!(next.decks[0].name, "First");
        assert_eq!(report.decks_skipped, 1);
    }

    #[test]
    fn test_dangling_course_references_are_pruned() {
        let data = BundleData {
            decks: vec![deck("d1", "Verbs")],
            courses: vec![course("k1", "B1", &["d1", "missing"])],
            ..Default::default()
        };

        let (next, report) = merge_into(&Collections::default(), data);
        assert_eq!(next.courses[0].deck_ids, vec!["d1".to_string()]);
        assert_eq!(report.references_pruned, 1);
    }
}
