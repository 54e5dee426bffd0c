//! Interactive chat application for conversing with a local model.
//!
//! This binary provides a REPL interface for chatting with models served by
//! a locally running Ollama server. The conversation so far is replayed to
//! the model on every turn, so the model sees the full history.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! ollamus-chat
//!
//! # Specify a model
//! ollamus-chat --model neural-chat
//!
//! # Seed the conversation context
//! ollamus-chat --seed "the capital of France is Paris"
//!
//! # Print the accumulated transcript when the session ends
//! ollamus-chat --print-transcript
//!
//! # Load settings from a YAML file (CLI flags take precedence)
//! ollamus-chat --config chat.yaml
//! ```
//!
//! Type the exit word (default: `exit`, matched case-insensitively) to end
//! the session. A transport failure ends the session abnormally with the
//! transport's diagnostic and a non-zero exit code.

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use ollamus::Ollama;
use ollamus::chat::{ChatArgs, ChatConfig, ChatSession, SessionInput};
use ollamus::render::PlainTextRenderer;

/// Main entry point for the ollamus-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("ollamus-chat [OPTIONS]");
    let config = match args.config.clone() {
        Some(path) => ChatConfig::from_file(path)?.apply(args),
        None => ChatConfig::from(args),
    };

    let client = Ollama::new(config.host.clone())?;
    let mut renderer = PlainTextRenderer::with_color(config.use_color)
        .with_answer_style(config.answer_prefix.clone(), config.answer_gap);
    let banner = config.banner();
    let print_transcript = config.print_transcript;
    let mut session = ChatSession::new(client, config)?;
    let mut rl = DefaultEditor::new()?;

    renderer.print_banner(&banner);

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                match session.classify(&line) {
                    SessionInput::Exit => break,
                    SessionInput::Say(input) => {
                        if !input.is_empty() {
                            let _ = rl.add_history_entry(&input);
                        }
                        // A pipeline failure propagates out of main and
                        // terminates the session abnormally.
                        let answer = session.send(&input).await?;
                        renderer.print_answer(&answer);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at the prompt - fresh prompt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                return Err(err.into());
            }
        }
    }

    if print_transcript {
        print!("{}", session.transcript());
    }

    Ok(())
}
