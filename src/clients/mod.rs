pub mod ai_client;
pub mod progress;

pub use ai_client::AnswerProvider;
pub use progress::{LogProgress, ProgressSink};
