use std::fmt;

/// Keys of the independently persisted records
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    CurrentUser,
    Decks,
    Courses,
    Folders,
    History,
    Theme,
    /// Active study session of one deck
    StudySession(String),
}

impl StorageKey {
    pub fn as_key(&self) -> String {
        match self {
            Self::CurrentUser => "current_user".to_string(),
            Self::Decks => "decks".to_string(),
            Self::Courses => "courses".to_string(),
            Self::Folders => "folders".to_string(),
            Self::History => "history".to_string(),
            Self::Theme => "theme".to_string(),
            Self::StudySession(deck_id) => format!("study_session_{}", deck_id),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}
