//! Users, their deck history and display preferences

pub mod models;

pub use models::*;
