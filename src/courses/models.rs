//! Data models for courses and folders
//!
//! Both group decks by id only. They never own the decks they reference;
//! keeping `deck_ids` free of dangling ids is the entity store's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flashcards::new_id;
use crate::profile::derive_user_id;

/// A shared grouping of decks with a member list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub author_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub deck_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn new(name: String, description: String, author_id: String) -> Self {
        Self {
            id: new_id(),
            author_id,
            name,
            description,
            member_ids: Vec::new(),
            deck_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether the user authored or joined this course
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.author_id == user_id || self.member_ids.iter().any(|m| m == user_id)
    }

    /// Add a member by display name. Returns false if already a member.
    pub fn add_member(&mut self, display_name: &str) -> bool {
        let member_id = derive_user_id(display_name);
        insert_unique(&mut self.member_ids, member_id)
    }

    pub fn add_deck(&mut self, deck_id: &str) -> bool {
        insert_unique(&mut self.deck_ids, deck_id.to_string())
    }

    pub fn remove_deck(&mut self, deck_id: &str) -> bool {
        remove_value(&mut self.deck_ids, deck_id)
    }
}

/// A private grouping of decks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub author_id: String,
    pub name: String,
    #[serde(default)]
    pub deck_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Folder {
    pub fn new(name: String, author_id: String) -> Self {
        Self {
            id: new_id(),
            author_id,
            name,
            deck_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_deck(&mut self, deck_id: &str) -> bool {
        insert_unique(&mut self.deck_ids, deck_id.to_string())
    }

    pub fn remove_deck(&mut self, deck_id: &str) -> bool {
        remove_value(&mut self.deck_ids, deck_id)
    }
}

fn insert_unique(values: &mut Vec<String>, value: String) -> bool {
    if values.contains(&value) {
        return false;
    }
    values.push(value);
    true
}

fn remove_value(values: &mut Vec<String>, value: &str) -> bool {
    let before = values.len();
    values.retain(|v| v != value);
    values.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_member_is_idempotent() {
        let mut course = Course::new("B1".to_string(), String::new(), "mia".to_string());

        assert!(course.add_member("Anna Musterfrau"));
        assert_eq!(course.member_ids, vec!["anna_musterfrau".to_string()]);

        assert!(!course.add_member("anna   musterfrau"));
        assert_eq!(course.member_ids.len(), 1);
    }

    #[test]
    fn test_visibility() {
        let mut course = Course::new("B1".to_string(), String::new(), "mia".to_string());
        course.add_member("Anna");

        assert!(course.is_visible_to("mia"));
        assert!(course.is_visible_to("anna"));
        assert!(!course.is_visible_to("max"));
    }

    #[test]
    fn test_deck_references_are_a_set() {
        let mut folder = Folder::new("Languages".to_string(), "anna".to_string());

        assert!(folder.add_deck("d1"));
        assert!(!folder.add_deck("d1"));
        assert_eq!(folder.deck_ids.len(), 1);

        assert!(folder.remove_deck("d1"));
        assert!(!folder.remove_deck("d1"));
        assert!(folder.deck_ids.is_empty());
    }
}
