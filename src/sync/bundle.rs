//! Portable JSON bundles exchanged as files between devices and users
//!
//! Three shapes are accepted on import:
//! - a full profile backup (no `type` discriminator, carries `decks`)
//! - a shared course (`"type": "course_share"`)
//! - a single exported deck (a bare deck record)
//!
//! Anything else is rejected before a merge is attempted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::courses::{Course, Folder};
use crate::flashcards::Deck;
use crate::profile::{HistoryEntry, User};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported bundle type: {0}")]
    UnsupportedType(String),

    #[error("Invalid {kind} bundle: {source}")]
    Invalid {
        kind: &'static str,
        source: serde_json::Error,
    },

    #[error("Unrecognized file format")]
    UnrecognizedShape,

    #[error("Sign in before importing a {0}")]
    NoActiveUser(&'static str),
}

pub type Result<T> = std::result::Result<T, ImportError>;

/// Complete backup of one user's data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullProfileBundle {
    #[serde(default)]
    pub user: Option<User>,
    pub decks: Vec<Deck>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

/// Discriminator of a shared course bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharedBundleType {
    #[serde(rename = "course_share")]
    CourseShare,
}

/// A course together with the decks it references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedCourseBundle {
    #[serde(rename = "type")]
    pub bundle_type: SharedBundleType,
    pub course: Course,
    #[serde(default)]
    pub decks: Vec<Deck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_by: Option<String>,
}

/// A decoded import file
#[derive(Debug, Clone, PartialEq)]
pub enum ImportBundle {
    FullProfile(FullProfileBundle),
    SharedCourse(SharedCourseBundle),
    SingleDeck(Deck),
}

impl ImportBundle {
    /// Decode an import file into one of the known bundle shapes
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Some(object) = value.as_object() else {
            return Err(ImportError::UnrecognizedShape);
        };

        let shape = match object.get("type") {
            Some(Value::String(t)) if t == "course_share" => Shape::CourseShare,
            Some(other) => {
                let name = other.as_str().map(str::to_string);
                return Err(ImportError::UnsupportedType(
                    name.unwrap_or_else(|| other.to_string()),
                ));
            }
            None if object.contains_key("decks") => Shape::FullProfile,
            None if object.contains_key("cards") => Shape::SingleDeck,
            None => return Err(ImportError::UnrecognizedShape),
        };

        let kind = shape.kind();
        let invalid = |source| ImportError::Invalid { kind, source };
        match shape {
            Shape::FullProfile => serde_json::from_value(value)
                .map(Self::FullProfile)
                .map_err(invalid),
            Shape::CourseShare => serde_json::from_value(value)
                .map(Self::SharedCourse)
                .map_err(invalid),
            Shape::SingleDeck => serde_json::from_value(value)
                .map(Self::SingleDeck)
                .map_err(invalid),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::FullProfile(_) => Shape::FullProfile.kind(),
            Self::SharedCourse(_) => Shape::CourseShare.kind(),
            Self::SingleDeck(_) => Shape::SingleDeck.kind(),
        }
    }
}

#[derive(Clone, Copy)]
enum Shape {
    FullProfile,
    CourseShare,
    SingleDeck,
}

impl Shape {
    fn kind(self) -> &'static str {
        match self {
            Self::FullProfile => "profile backup",
            Self::CourseShare => "course share",
            Self::SingleDeck => "deck",
        }
    }
}
