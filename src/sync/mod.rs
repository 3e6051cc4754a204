//! Manual sync by file exchange
//!
//! Profiles, single decks and shared courses travel as JSON bundles. This
//! module decodes them, builds them for export and merges imported records
//! into the entity store.

pub mod bundle;
pub mod export;
pub mod import;
pub mod merge;

pub use bundle::{
    FullProfileBundle, ImportBundle, ImportError, SharedBundleType, SharedCourseBundle,
};
pub use export::{
    course_file_name, deck_file_name, export_course_share, export_profile, profile_file_name,
    to_json,
};
pub use import::{import_bundle, import_json, ImportKind, ImportOutcome};
pub use merge::{merge_into, BundleData, MergeReport};
