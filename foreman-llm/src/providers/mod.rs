//! Completion provider implementations
//!
//! Concrete implementations of the CompletionProvider trait for hosted
//! model services.

pub mod openai;

pub use openai::OpenAiCompletionProvider;
