//! Answer generation: prompt assembly and the completion client

pub mod completion;
pub mod prompt;

pub use completion::ChatCompletionClient;
pub use prompt::PromptBuilder;
