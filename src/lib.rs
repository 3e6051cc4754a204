use std::sync::{Arc, Mutex};

use thiserror::Error;

pub mod assistant;
pub mod commands;
pub mod config;
pub mod courses;
pub mod flashcards;
pub mod profile;
pub mod storage;
pub mod store;
pub mod study;
pub mod sync;

use assistant::{AssistantError, GeminiClient, StudyAssistant};
use config::{AppConfig, ConfigError};
use storage::{FileKeyValueStore, KeyValueStore, StorageError};
use store::EntityStore;
use study::{RandomSource, RngSource, StudySession};

/// Builds the random source for each new study session
pub type RandomFactory = Box<dyn Fn() -> Box<dyn RandomSource> + Send + Sync>;

pub struct AppState {
    pub config: AppConfig,
    pub kv: Arc<dyn KeyValueStore>,
    pub store: Mutex<EntityStore>,
    /// At most one study session is active at a time
    pub study: Mutex<Option<StudySession>>,
    pub assistant: Arc<dyn StudyAssistant>,
    /// Held while a deck is being generated
    pub generation: tokio::sync::Mutex<()>,
    pub random: RandomFactory,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        kv: Arc<dyn KeyValueStore>,
        assistant: Arc<dyn StudyAssistant>,
    ) -> Self {
        let store = EntityStore::load(Arc::clone(&kv));
        Self {
            config,
            kv,
            store: Mutex::new(store),
            study: Mutex::new(None),
            assistant,
            generation: tokio::sync::Mutex::new(()),
            random: Box::new(|| Box::new(RngSource::from_entropy())),
        }
    }
}

#[derive(Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
}

/// Install a stderr logger unless the host already set one up
pub fn init_logging(level: &str) {
    let _ = env_logger::Builder::new().parse_filters(level).try_init();
}

/// Open the data directory and wire up the application state
pub fn init(config: AppConfig) -> Result<AppState, InitError> {
    init_logging(&config.log_level);

    let data_dir = config.data_dir()?;
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(data_dir.clone())?);
    let assistant: Arc<dyn StudyAssistant> = Arc::new(GeminiClient::new(&config.assistant)?);

    log::info!("Using data directory {:?}", data_dir);
    Ok(AppState::new(config, kv, assistant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_uses_configured_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            data_dir: Some(dir.path().join("data")),
            ..Default::default()
        };

        let state = init(config).unwrap();
        {
            let mut store = state.store.lock().unwrap();
            let user = store.login("Anna").unwrap();
            store.create_deck("Verbs".to_string(), user.id);
        }

        // A second start sees what the first one wrote
        let config = AppConfig {
            data_dir: Some(dir.path().join("data")),
            ..Default::default()
        };
        let state = init(config).unwrap();
        let store = state.store.lock().unwrap();
        assert_eq!(store.current_user().unwrap().id, "anna");
        assert_eq!(store.decks().len(), 1);
    }
}
