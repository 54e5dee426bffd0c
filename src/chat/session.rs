//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the
//! accumulating conversation context and drives the request pipeline, one
//! exchange per call.

use crate::chat::commands::{SessionInput, classify_input};
use crate::chat::config::ChatConfig;
use crate::error::Result;
use crate::observability;
use crate::pipeline::{CompletionBackend, Pipeline};
use crate::template::{DEFAULT_TEMPLATE, PromptTemplate};
use crate::types::{GenerateResponse, Model};

/// A chat session that owns the conversation context and the pipeline.
///
/// The context is a single string. It starts from the optional seed and
/// grows by one `"\nUser: {input}\n AI: {response}\n"` block per successful
/// exchange; it is never truncated and never persisted.
pub struct ChatSession<B: CompletionBackend> {
    pipeline: Pipeline<B>,
    exit_word: String,
    context: String,
    seed_len: usize,
    turns: u64,
    total_prompt_eval_tokens: u64,
    total_eval_tokens: u64,
    last_turn_prompt_eval_tokens: Option<u64>,
    last_turn_eval_tokens: Option<u64>,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of completed exchanges.
    pub turns: u64,
    /// The current length of the context, in bytes.
    pub context_len: usize,
    /// Total prompt tokens evaluated across all exchanges, as reported by
    /// the server.
    pub total_prompt_eval_tokens: u64,
    /// Total tokens generated across all exchanges.
    pub total_eval_tokens: u64,
    /// Prompt tokens for the last exchange, if reported.
    pub last_turn_prompt_eval_tokens: Option<u64>,
    /// Generated tokens for the last exchange, if reported.
    pub last_turn_eval_tokens: Option<u64>,
}

impl<B: CompletionBackend> ChatSession<B> {
    /// Creates a new chat session from a backend and a configuration.
    ///
    /// The configured template (or the default chat template) is parsed
    /// here; the context is initialized to `"{seed_label}: {seed}"` when a
    /// seed is supplied and left empty otherwise.
    pub fn new(backend: B, config: ChatConfig) -> Result<Self> {
        let template = match &config.template {
            Some(text) => PromptTemplate::new(text.clone())?,
            None => PromptTemplate::new(DEFAULT_TEMPLATE)?,
        };
        let pipeline = Pipeline::new(backend, config.model.clone(), template)
            .with_options(config.generate_options());
        let context = match &config.seed {
            Some(seed) => format!("{}: {}", config.seed_label, seed),
            None => String::new(),
        };
        let seed_len = context.len();
        Ok(Self {
            pipeline,
            exit_word: config.exit_word,
            context,
            seed_len,
            turns: 0,
            total_prompt_eval_tokens: 0,
            total_eval_tokens: 0,
            last_turn_prompt_eval_tokens: None,
            last_turn_eval_tokens: None,
        })
    }

    /// Classifies one line of input against this session's exit sentinel.
    pub fn classify(&self, line: &str) -> SessionInput {
        classify_input(line, &self.exit_word)
    }

    /// Sends one question through the pipeline and returns the answer.
    ///
    /// The pipeline sees the context exactly as it stood before this call.
    /// On success the exchange is appended to the context; on error the
    /// context is unchanged and the error propagates to the caller. Nothing
    /// is retried and nothing is de-duplicated: the same input sent twice
    /// produces two pipeline calls against different contexts.
    pub async fn send(&mut self, input: &str) -> Result<String> {
        let outcome = self
            .pipeline
            .invoke(&self.context, input)
            .await
            .inspect_err(|_| {
                observability::CHAT_TURN_ERRORS.click();
            })?;
        self.record_usage(&outcome);
        let answer = outcome.response;
        self.context
            .push_str(&format!("\nUser: {input}\n AI: {answer}\n"));
        self.turns += 1;
        observability::CHAT_TURNS.click();
        Ok(answer)
    }

    /// The full context, seed prefix included.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The portion of the context accumulated during this session, i.e.
    /// everything after the seed prefix.
    pub fn transcript(&self) -> &str {
        &self.context[self.seed_len..]
    }

    /// The session's exit sentinel.
    pub fn exit_word(&self) -> &str {
        &self.exit_word
    }

    /// The model this session queries.
    pub fn model(&self) -> &Model {
        self.pipeline.model()
    }

    /// The number of completed exchanges.
    pub fn turn_count(&self) -> u64 {
        self.turns
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.pipeline.model().clone(),
            turns: self.turns,
            context_len: self.context.len(),
            total_prompt_eval_tokens: self.total_prompt_eval_tokens,
            total_eval_tokens: self.total_eval_tokens,
            last_turn_prompt_eval_tokens: self.last_turn_prompt_eval_tokens,
            last_turn_eval_tokens: self.last_turn_eval_tokens,
        }
    }

    fn record_usage(&mut self, outcome: &GenerateResponse) {
        self.last_turn_prompt_eval_tokens = outcome.prompt_eval_count;
        self.last_turn_eval_tokens = outcome.eval_count;
        self.total_prompt_eval_tokens = self
            .total_prompt_eval_tokens
            .saturating_add(outcome.prompt_eval_count.unwrap_or(0));
        self.total_eval_tokens = self
            .total_eval_tokens
            .saturating_add(outcome.eval_count.unwrap_or(0));
    }
}
