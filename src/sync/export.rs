//! Building export files from the local store

use chrono::Utc;
use serde::Serialize;

use crate::courses::Course;
use crate::flashcards::Deck;
use crate::profile::User;
use crate::store::EntityStore;

use super::bundle::{FullProfileBundle, Result, SharedBundleType, SharedCourseBundle};

/// Back up everything the user can see
pub fn export_profile(store: &EntityStore, user: &User) -> FullProfileBundle {
    FullProfileBundle {
        user: Some(user.clone()),
        decks: store.decks_for(&user.id),
        courses: store.courses_for(&user.id),
        folders: store.folders_for(&user.id),
        history: store.history_for(&user.id),
        export_date: Some(Utc::now()),
        app_version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

/// Package a course with every deck it references
pub fn export_course_share(
    store: &EntityStore,
    course: &Course,
    exported_by: Option<String>,
) -> SharedCourseBundle {
    let decks = course
        .deck_ids
        .iter()
        .filter_map(|id| store.deck(id))
        .cloned()
        .collect();

    SharedCourseBundle {
        bundle_type: SharedBundleType::CourseShare,
        course: course.clone(),
        decks,
        exported_by,
    }
}

pub fn to_json<T: Serialize>(bundle: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(bundle)?)
}

/// Suggested file name for a profile backup
pub fn profile_file_name(user: &User) -> String {
    format!(
        "lernkarten_backup_{}_{}.json",
        slug(&user.id),
        Utc::now().format("%Y-%m-%d")
    )
}

pub fn deck_file_name(deck: &Deck) -> String {
    format!("deck_{}.json", slug(&deck.name))
}

pub fn course_file_name(course: &Course) -> String {
    format!("course_{}.json", slug(&course.name))
}

/// Lowercase ASCII alphanumerics; everything else collapses to one underscore
fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let trimmed = slug.trim_matches('_');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use crate::sync::ImportBundle;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Spanish Verbs (A1)"), "spanish_verbs_a1");
        assert_eq!(slug("???"), "untitled");
    }

    #[test]
    fn test_export_profile_contains_only_visible_data() {
        let mut store = EntityStore::load(Arc::new(MemoryKeyValueStore::new()));
        let anna = store.login("Anna").unwrap();
        store.create_deck("Mine".to_string(), anna.id.clone());
        store.create_deck("Theirs".to_string(), "max".to_string());

        let bundle = export_profile(&store, &anna);
        assert_eq!(bundle.decks.len(), 1);
        assert_eq!(bundle.decks[0].name, "Mine");
        assert!(bundle.app_version.is_some());

        let json = to_json(&bundle).unwrap();
        assert!(matches!(
            ImportBundle::parse(&json).unwrap(),
            ImportBundle::FullProfile(_)
        ));
    }

    #[test]
    fn test_export_course_share_includes_referenced_decks() {
        let mut store = EntityStore::load(Arc::new(MemoryKeyValueStore::new()));
        let deck = store.create_deck("Verbs".to_string(), "mia".to_string());
        store.create_deck("Unrelated".to_string(), "mia".to_string());
        let course = store.create_course("B1", "", "mia".to_string()).unwrap();
        store.add_deck_to_course(&course.id, &deck.id);
        let course = store.course(&course.id).unwrap().clone();

        let bundle = export_course_share(&store, &course, Some("Mia".to_string()));
        assert_eq!(bundle.decks.len(), 1);
        assert_eq!(bundle.decks[0].id, deck.id);

        let json = to_json(&bundle).unwrap();
        assert!(matches!(
            ImportBundle::parse(&json).unwrap(),
            ImportBundle::SharedCourse(_)
        ));
    }
}
