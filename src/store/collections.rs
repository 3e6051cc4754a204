//! Immutable snapshots of every entity collection

use std::collections::HashSet;
use std::sync::Arc;

use crate::courses::{Course, Folder};
use crate::flashcards::Deck;
use crate::profile::HistoryEntry;

/// Records addressed by a globally unique id
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Deck {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Course {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Folder {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for HistoryEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// One snapshot of all collections.
///
/// Collections are shared behind `Arc` and never mutated in place: an edit
/// builds a new `Vec` and swaps it in, so a snapshot handed out earlier
/// keeps seeing the data it was taken from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub decks: Arc<Vec<Deck>>,
    pub courses: Arc<Vec<Course>>,
    pub folders: Arc<Vec<Folder>>,
    pub history: Arc<Vec<HistoryEntry>>,
}

impl Collections {
    /// Drop course and folder references to decks that no longer exist.
    ///
    /// Collections without dangling ids are left untouched (same `Arc`).
    pub fn prune_dangling_references(&mut self) -> usize {
        let existing: HashSet<String> = self.decks.iter().map(|d| d.id.clone()).collect();
        let mut pruned = 0;

        if self
            .courses
            .iter()
            .any(|c| c.deck_ids.iter().any(|id| !existing.contains(id)))
        {
            let mut courses = self.courses.as_ref().clone();
            for course in &mut courses {
                let before = course.deck_ids.len();
                course.deck_ids.retain(|id| existing.contains(id));
                pruned += before - course.deck_ids.len();
            }
            self.courses = Arc::new(courses);
        }

        if self
            .folders
            .iter()
            .any(|f| f.deck_ids.iter().any(|id| !existing.contains(id)))
        {
            let mut folders = self.folders.as_ref().clone();
            for folder in &mut folders {
                let before = folder.deck_ids.len();
                folder.deck_ids.retain(|id| existing.contains(id));
                pruned += before - folder.deck_ids.len();
            }
            self.folders = Arc::new(folders);
        }

        pruned
    }
}
