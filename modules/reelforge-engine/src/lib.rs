pub mod batch;
pub mod chain;
pub mod profiles;
pub mod retry;

pub use batch::{generate_batch, BatchError, BatchSpec, BatchTuning};
pub use chain::{image_chain, video_chain, ChainEntry, ChainError, FallbackChain};
pub use retry::{with_retry, RetryTuning};
