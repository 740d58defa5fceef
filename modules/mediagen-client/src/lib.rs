pub mod gemini;
pub mod huggingface;
pub mod nvidia;
pub mod poll;
pub mod pollinations;
pub mod traits;
pub mod util;

pub use gemini::GeminiImageClient;
pub use huggingface::{HuggingFaceImageClient, HuggingFaceVideoClient};
pub use nvidia::{NvidiaImageClient, NvidiaVideoClient};
pub use poll::{PollOutcome, PollTuning};
pub use pollinations::PollinationsClient;
pub use traits::MediaProvider;
