pub mod client;
pub mod error;
pub mod ideas;
pub mod metadata;
pub mod script;
pub mod types;
pub mod util;

pub use client::GeminiTextClient;
pub use error::TextgenError;
pub use ideas::{viral_ideas, VideoIdea};
pub use metadata::{generate_metadata, VideoMetadata};
pub use script::{viral_script, SceneScript, VideoScript};
pub use types::VideoFormat;
