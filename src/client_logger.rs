//! Logging trait for Ollama client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to
//! capture and log all API interactions passing through the [`Ollama`]
//! client.
//!
//! [`Ollama`]: crate::Ollama

use crate::types::GenerateResponse;

/// A trait for logging Ollama client operations.
///
/// Implement this trait to capture and record all API interactions, both
/// complete non-streaming responses and individual streamed chunks.
///
/// # Example
///
/// ```rust,ignore
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// use ollamus::{ClientLogger, GenerateResponse};
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_response(&self, response: &GenerateResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{}", serde_json::to_string(response).unwrap()).unwrap();
///     }
///
///     fn log_stream_chunk(&self, chunk: &GenerateResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "chunk: {}", serde_json::to_string(chunk).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a complete response from a non-streaming `generate` call.
    ///
    /// This method is called once per successful `generate` call with the
    /// full [`GenerateResponse`] from the server.
    fn log_response(&self, response: &GenerateResponse);

    /// Log an individual streamed chunk.
    ///
    /// This method is called for each chunk decoded during a streaming
    /// request, including the final chunk that carries the timing and
    /// token-count fields.
    fn log_stream_chunk(&self, chunk: &GenerateResponse);
}
