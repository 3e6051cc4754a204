pub mod models;
pub mod queue;
pub mod random;
pub mod session;
pub mod transcript;

pub use models::*;
pub use queue::StudyQueue;
pub use random::{RandomSource, RngSource};
pub use session::{clear_saved, StudySession};
pub use transcript::{SessionTranscript, SwipeTally, TranscriptEntry};
