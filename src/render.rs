//! Terminal output for the chat binary.
//!
//! This module provides a plain-text renderer with optional ANSI styling
//! for the banner, per-turn answers, and diagnostics.

use std::io::{self, Stdout, Write};

/// ANSI escape code for bold text (used for the banner).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for cyan text (used for the answer prefix).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Plain text renderer with optional ANSI styling.
///
/// Answers are printed with a configurable prefix and, optionally, a blank
/// line after each one.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    answer_prefix: String,
    answer_gap: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
            answer_prefix: "AI: ".to_string(),
            answer_gap: true,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            use_color,
            ..Self::new()
        }
    }

    /// Sets the answer prefix and whether a blank line follows each answer.
    pub fn with_answer_style(mut self, answer_prefix: String, answer_gap: bool) -> Self {
        self.answer_prefix = answer_prefix;
        self.answer_gap = answer_gap;
        self
    }

    /// Flushes stdout to ensure immediate display.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    /// Print the welcome banner.
    pub fn print_banner(&mut self, banner: &str) {
        if self.use_color {
            println!("{ANSI_BOLD}{banner}{ANSI_RESET}");
        } else {
            println!("{banner}");
        }
        self.flush();
    }

    /// Print one turn's answer.
    pub fn print_answer(&mut self, text: &str) {
        if self.use_color {
            println!("{ANSI_CYAN}{}{ANSI_RESET}{text}", self.answer_prefix);
        } else {
            println!("{}{text}", self.answer_prefix);
        }
        if self.answer_gap {
            println!();
        }
        self.flush();
    }

    /// Print an error message.
    pub fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
        assert_eq!(renderer.answer_prefix, "AI: ");
        assert!(renderer.answer_gap);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn renderer_answer_style() {
        let renderer = PlainTextRenderer::with_color(false)
            .with_answer_style("AI chatbot: ".to_string(), false);
        assert_eq!(renderer.answer_prefix, "AI chatbot: ");
        assert!(!renderer.answer_gap);
    }
}
