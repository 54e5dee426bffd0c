// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod render;
pub mod template;
pub mod types;
pub mod utils;

// Re-exports
pub use client::Ollama;
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use pipeline::{CompletionBackend, Pipeline};
pub use render::PlainTextRenderer;
pub use template::{DEFAULT_TEMPLATE, PromptTemplate};
pub use types::*;
