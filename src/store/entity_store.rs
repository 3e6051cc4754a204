//! The authoritative in-memory store of decks, courses, folders and history
//!
//! Each collection is persisted under its own key after every change.
//! Lookups of a card's owning deck scan the decks; card membership is not
//! cached anywhere else.

use std::sync::Arc;

use crate::courses::{Course, Folder};
use crate::flashcards::{CardDraft, CardStatus, Deck, Flashcard};
use crate::profile::{HistoryAction, HistoryEntry, User};
use crate::storage::{
    load_json, load_json_or_default, persist, KeyValueStore, StorageKey,
};

use super::collections::Collections;

pub struct EntityStore {
    kv: Arc<dyn KeyValueStore>,
    current_user: Option<User>,
    collections: Collections,
}

impl EntityStore {
    /// Load every collection from the key-value store.
    ///
    /// Missing or corrupt records start out empty.
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let current_user = load_json(kv.as_ref(), &StorageKey::CurrentUser);
        let collections = Collections {
            decks: Arc::new(load_json_or_default(kv.as_ref(), &StorageKey::Decks)),
            courses: Arc::new(load_json_or_default(kv.as_ref(), &StorageKey::Courses)),
            folders: Arc::new(load_json_or_default(kv.as_ref(), &StorageKey::Folders)),
            history: Arc::new(load_json_or_default(kv.as_ref(), &StorageKey::History)),
        };

        log::info!(
            "Loaded {} decks, {} courses, {} folders, {} history entries",
            collections.decks.len(),
            collections.courses.len(),
            collections.folders.len(),
            collections.history.len()
        );

        Self {
            kv,
            current_user,
            collections,
        }
    }

    // ==================== Identity ====================

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Sign in under a display name. Blank names are rejected.
    pub fn login(&mut self, display_name: &str) -> Option<User> {
        let user = User::from_display_name(display_name)?;
        self.set_current_user(user.clone());
        Some(user)
    }

    pub fn set_current_user(&mut self, user: User) {
        log::info!("Active user is now {}", user.id);
        persist(self.kv.as_ref(), &StorageKey::CurrentUser, &user);
        self.current_user = Some(user);
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.kv.remove(&StorageKey::CurrentUser.as_key()) {
            log::error!("Failed to clear current user: {}", e);
        }
        self.current_user = None;
    }

    // ==================== Snapshots ====================

    pub fn snapshot(&self) -> Collections {
        self.collections.clone()
    }

    /// Replace the collections wholesale, persisting those that changed
    pub fn replace(&mut self, next: Collections) {
        let kv = self.kv.as_ref();
        if !Arc::ptr_eq(&self.collections.decks, &next.decks) {
            persist(kv, &StorageKey::Decks, next.decks.as_ref());
        }
        if !Arc::ptr_eq(&self.collections.courses, &next.courses) {
            persist(kv, &StorageKey::Courses, next.courses.as_ref());
        }
        if !Arc::ptr_eq(&self.collections.folders, &next.folders) {
            persist(kv, &StorageKey::Folders, next.folders.as_ref());
        }
        if !Arc::ptr_eq(&self.collections.history, &next.history) {
            persist(kv, &StorageKey::History, next.history.as_ref());
        }
        self.collections = next;
    }

    pub fn decks(&self) -> Arc<Vec<Deck>> {
        Arc::clone(&self.collections.decks)
    }

    pub fn courses(&self) -> Arc<Vec<Course>> {
        Arc::clone(&self.collections.courses)
    }

    pub fn folders(&self) -> Arc<Vec<Folder>> {
        Arc::clone(&self.collections.folders)
    }

    pub fn history(&self) -> Arc<Vec<HistoryEntry>> {
        Arc::clone(&self.collections.history)
    }

    // ==================== Per-user views ====================

    pub fn decks_for(&self, user_id: &str) -> Vec<Deck> {
        self.collections
            .decks
            .iter()
            .filter(|d| d.author_id == user_id)
            .cloned()
            .collect()
    }

    pub fn courses_for(&self, user_id: &str) -> Vec<Course> {
        self.collections
            .courses
            .iter()
            .filter(|c| c.is_visible_to(user_id))
            .cloned()
            .collect()
    }

    pub fn folders_for(&self, user_id: &str) -> Vec<Folder> {
        self.collections
            .folders
            .iter()
            .filter(|f| f.author_id == user_id)
            .cloned()
            .collect()
    }

    /// History of a user, newest first
    pub fn history_for(&self, user_id: &str) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .collections
            .history
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    pub fn deck(&self, deck_id: &str) -> Option<&Deck> {
        self.collections.decks.iter().find(|d| d.id == deck_id)
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.collections.courses.iter().find(|c| c.id == course_id)
    }

    pub fn folder(&self, folder_id: &str) -> Option<&Folder> {
        self.collections.folders.iter().find(|f| f.id == folder_id)
    }

    /// Find the deck holding a card
    pub fn owning_deck(&self, card_id: &str) -> Option<&Deck> {
        self.collections
            .decks
            .iter()
            .find(|d| d.contains_card(card_id))
    }

    // ==================== Deck Operations ====================

    pub fn create_deck(&mut self, name: String, author_id: String) -> Deck {
        let deck = Deck::new(name, author_id);
        let created = deck.clone();
        self.edit_decks(|decks| {
            decks.push(deck);
            true
        });
        log::info!("Created deck {} ({})", created.name, created.id);
        created
    }

    /// Append drafted cards to a deck. Unknown decks are a no-op.
    pub fn add_cards(&mut self, deck_id: &str, drafts: Vec<CardDraft>) -> Vec<Flashcard> {
        let cards: Vec<Flashcard> = drafts.into_iter().map(Flashcard::from).collect();
        let added = self.edit_decks(|decks| match decks.iter_mut().find(|d| d.id == deck_id) {
            Some(deck) => {
                deck.cards.extend(cards.iter().cloned());
                true
            }
            None => false,
        });
        if added {
            cards
        } else {
            Vec::new()
        }
    }

    pub fn add_card(
        &mut self,
        deck_id: &str,
        term: String,
        definition: String,
        example_sentence: String,
    ) -> Option<Flashcard> {
        let draft = CardDraft {
            term,
            definition,
            example_sentence,
        };
        self.add_cards(deck_id, vec![draft]).into_iter().next()
    }

    /// Delete a deck and pull its id out of every course and folder
    pub fn delete_deck(&mut self, deck_id: &str) -> bool {
        let removed = self.edit_decks(|decks| {
            let before = decks.len();
            decks.retain(|d| d.id != deck_id);
            decks.len() != before
        });
        if !removed {
            return false;
        }

        self.edit_courses(|courses| {
            courses
                .iter_mut()
                .fold(false, |changed, c| c.remove_deck(deck_id) || changed)
        });
        self.edit_folders(|folders| {
            folders
                .iter_mut()
                .fold(false, |changed, f| f.remove_deck(deck_id) || changed)
        });

        log::info!("Deleted deck {}", deck_id);
        true
    }

    pub fn rename_deck(&mut self, deck_id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.edit_decks(|decks| match decks.iter_mut().find(|d| d.id == deck_id) {
            Some(deck) => {
                deck.name = name.to_string();
                true
            }
            None => false,
        })
    }

    /// Replace a card inside whichever deck holds it
    pub fn update_card(&mut self, card: &Flashcard) -> bool {
        self.edit_owned_card(&card.id, |existing| *existing = card.clone())
    }

    pub fn set_card_status(&mut self, card_id: &str, status: CardStatus) -> bool {
        self.edit_owned_card(card_id, |existing| existing.status = status)
    }

    pub fn delete_card(&mut self, card_id: &str) -> bool {
        self.edit_decks(|decks| {
            match decks.iter_mut().find(|d| d.contains_card(card_id)) {
                Some(deck) => {
                    deck.cards.retain(|c| c.id != card_id);
                    true
                }
                None => false,
            }
        })
    }

    // ==================== Course / Folder Operations ====================

    /// Create a course. Blank names are silently rejected.
    pub fn create_course(
        &mut self,
        name: &str,
        description: &str,
        author_id: String,
    ) -> Option<Course> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let course = Course::new(name.to_string(), description.trim().to_string(), author_id);
        let created = course.clone();
        self.edit_courses(|courses| {
            courses.push(course);
            true
        });
        log::info!("Created course {} ({})", created.name, created.id);
        Some(created)
    }

    /// Create a folder. Blank names are silently rejected.
    pub fn create_folder(&mut self, name: &str, author_id: String) -> Option<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let folder = Folder::new(name.to_string(), author_id);
        let created = folder.clone();
        self.edit_folders(|folders| {
            folders.push(folder);
            true
        });
        Some(created)
    }

    pub fn rename_folder(&mut self, folder_id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.edit_folder(folder_id, |f| {
            f.name = name.to_string();
            true
        })
    }

    pub fn delete_course(&mut self, course_id: &str) -> bool {
        self.edit_courses(|courses| {
            let before = courses.len();
            courses.retain(|c| c.id != course_id);
            courses.len() != before
        })
    }

    pub fn delete_folder(&mut self, folder_id: &str) -> bool {
        self.edit_folders(|folders| {
            let before = folders.len();
            folders.retain(|f| f.id != folder_id);
            folders.len() != before
        })
    }

    pub fn add_member(&mut self, course_id: &str, display_name: &str) -> bool {
        if display_name.trim().is_empty() {
            return false;
        }
        self.edit_course(course_id, |c| c.add_member(display_name))
    }

    pub fn add_deck_to_course(&mut self, course_id: &str, deck_id: &str) -> bool {
        if self.deck(deck_id).is_none() {
            return false;
        }
        self.edit_course(course_id, |c| c.add_deck(deck_id))
    }

    pub fn remove_deck_from_course(&mut self, course_id: &str, deck_id: &str) -> bool {
        self.edit_course(course_id, |c| c.remove_deck(deck_id))
    }

    pub fn add_deck_to_folder(&mut self, folder_id: &str, deck_id: &str) -> bool {
        if self.deck(deck_id).is_none() {
            return false;
        }
        self.edit_folder(folder_id, |f| f.add_deck(deck_id))
    }

    pub fn remove_deck_from_folder(&mut self, folder_id: &str, deck_id: &str) -> bool {
        self.edit_folder(folder_id, |f| f.remove_deck(deck_id))
    }

    // ==================== History ====================

    pub fn record_history(
        &mut self,
        user_id: String,
        deck: &Deck,
        action: HistoryAction,
    ) -> HistoryEntry {
        let entry = HistoryEntry::new(user_id, deck, action);
        let recorded = entry.clone();
        let mut history = self.collections.history.as_ref().clone();
        history.push(entry);
        let mut next = self.snapshot();
        next.history = Arc::new(history);
        self.replace(next);
        recorded
    }

    // ==================== Copy-on-write helpers ====================

    /// Apply `edit` to a copy of the decks; swap it in if `edit` reports a change
    fn edit_decks(&mut self, edit: impl FnOnce(&mut Vec<Deck>) -> bool) -> bool {
        let mut decks = self.collections.decks.as_ref().clone();
        if !edit(&mut decks) {
            return false;
        }
        let mut next = self.snapshot();
        next.decks = Arc::new(decks);
        self.replace(next);
        true
    }

    fn edit_courses(&mut self, edit: impl FnOnce(&mut Vec<Course>) -> bool) -> bool {
        let mut courses = self.collections.courses.as_ref().clone();
        if !edit(&mut courses) {
            return false;
        }
        let mut next = self.snapshot();
        next.courses = Arc::new(courses);
        self.replace(next);
        true
    }

    fn edit_folders(&mut self, edit: impl FnOnce(&mut Vec<Folder>) -> bool) -> bool {
        let mut folders = self.collections.folders.as_ref().clone();
        if !edit(&mut folders) {
            return false;
        }
        let mut next = self.snapshot();
        next.folders = Arc::new(folders);
        self.replace(next);
        true
    }

    fn edit_course(&mut self, course_id: &str, edit: impl FnOnce(&mut Course) -> bool) -> bool {
        self.edit_courses(|courses| match courses.iter_mut().find(|c| c.id == course_id) {
            Some(course) => edit(course),
            None => false,
        })
    }

    fn edit_folder(&mut self, folder_id: &str, edit: impl FnOnce(&mut Folder) -> bool) -> bool {
        self.edit_folders(|folders| match folders.iter_mut().find(|f| f.id == folder_id) {
            Some(folder) => edit(folder),
            None => false,
        })
    }

    fn edit_owned_card(&mut self, card_id: &str, edit: impl FnOnce(&mut Flashcard)) -> bool {
        self.edit_decks(|decks| {
            let card = decks
                .iter_mut()
                .flat_map(|d| d.cards.iter_mut())
                .find(|c| c.id == card_id);
            match card {
                Some(card) => {
                    edit(card);
                    true
                }
                None => false,
            }
        })
    }
}
