//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg`, YAML
//! configuration files, and the resolved configuration structure for
//! controlling chat behavior.

use std::path::Path;

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{GenerateOptions, KnownModel, Model};

/// Default label prefixed to a supplied seed.
const DEFAULT_SEED_LABEL: &str = "data";

/// Default exit sentinel.
const DEFAULT_EXIT_WORD: &str = "exit";

/// Default prefix printed before each answer.
const DEFAULT_ANSWER_PREFIX: &str = "AI: ";

/// Command-line arguments for the ollamus-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Path to a YAML configuration file.
    #[arrrg(optional, "Path to a YAML configuration file", "FILE")]
    pub config: Option<String>,

    /// Base URL of the model server.
    #[arrrg(optional, "Model server base URL (default: http://localhost:11434)", "URL")]
    pub host: Option<String>,

    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: llama3.1)", "MODEL")]
    pub model: Option<String>,

    /// Seed text for the initial context.
    #[arrrg(optional, "Seed text for the initial context", "TEXT")]
    pub seed: Option<String>,

    /// Label prefixed to the seed when building the initial context.
    #[arrrg(optional, "Label prefixed to the seed (default: data)", "LABEL")]
    pub seed_label: Option<String>,

    /// The word that ends the session.
    #[arrrg(optional, "Word that ends the session (default: exit)", "WORD")]
    pub exit_word: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Print the accumulated transcript on exit.
    #[arrrg(flag, "Print the accumulated transcript on exit")]
    pub print_transcript: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// the optional configuration file and command-line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Base URL of the model server, if not the default.
    pub host: Option<String>,

    /// Prompt template text. `None` uses the default chat template.
    pub template: Option<String>,

    /// Seed text for the initial context.
    pub seed: Option<String>,

    /// Label prefixed to the seed when building the initial context.
    pub seed_label: String,

    /// The case-insensitive word that ends the session.
    pub exit_word: String,

    /// Welcome banner. `None` derives one from the model and exit word.
    pub banner: Option<String>,

    /// Prefix printed before each answer.
    pub answer_prefix: String,

    /// Whether a blank line follows each answer.
    pub answer_gap: bool,

    /// Whether the accumulated transcript is printed on exit.
    pub print_transcript: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Optional sampling temperature.
    pub temperature: Option<f32>,

    /// Optional top-p nucleus sampling value.
    pub top_p: Option<f32>,

    /// Optional top-k sampling limit.
    pub top_k: Option<u32>,

    /// Optional cap on tokens generated per answer.
    pub num_predict: Option<i32>,

    /// Stop sequences supplied on every request.
    pub stop_sequences: Vec<String>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: llama3.1
    /// - Seed label: "data"
    /// - Exit word: "exit"
    /// - Answer prefix: "AI: ", with a blank line after each answer
    /// - Color: enabled
    /// - Transcript printing: disabled
    pub fn new() -> Self {
        Self {
            model: Model::Known(KnownModel::Llama31),
            host: None,
            template: None,
            seed: None,
            seed_label: DEFAULT_SEED_LABEL.to_string(),
            exit_word: DEFAULT_EXIT_WORD.to_string(),
            banner: None,
            answer_prefix: DEFAULT_ANSWER_PREFIX.to_string(),
            answer_gap: true,
            print_transcript: false,
            use_color: true,
            temperature: None,
            top_p: None,
            top_k: None,
            num_predict: None,
            stop_sequences: Vec::new(),
        }
    }

    /// Loads a configuration file, merging its keys over the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|err| Error::io("failed to read config file", err))?;
        let file: ChatConfigFile = serde_yaml::from_str(&text).map_err(|err| {
            Error::serialization("failed to parse config file", Some(Box::new(err)))
        })?;
        Ok(file.into_config())
    }

    /// Layers command-line overrides on top of this configuration.
    pub fn apply(mut self, args: ChatArgs) -> Self {
        if let Some(model) = args.model {
            self.model = Model::from(model);
        }
        if let Some(host) = args.host {
            self.host = Some(host);
        }
        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if let Some(seed_label) = args.seed_label {
            self.seed_label = seed_label;
        }
        if let Some(exit_word) = args.exit_word {
            self.exit_word = exit_word;
        }
        if args.no_color {
            self.use_color = false;
        }
        if args.print_transcript {
            self.print_transcript = true;
        }
        self
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the prompt template text.
    pub fn with_template(mut self, template: String) -> Self {
        self.template = Some(template);
        self
    }

    /// Sets the seed text.
    pub fn with_seed(mut self, seed: String) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the seed label.
    pub fn with_seed_label(mut self, seed_label: String) -> Self {
        self.seed_label = seed_label;
        self
    }

    /// Sets the exit word.
    pub fn with_exit_word(mut self, exit_word: String) -> Self {
        self.exit_word = exit_word;
        self
    }

    /// Sets the banner text.
    pub fn with_banner(mut self, banner: String) -> Self {
        self.banner = Some(banner);
        self
    }

    /// Sets the answer prefix and gap.
    pub fn with_answer_style(mut self, answer_prefix: String, answer_gap: bool) -> Self {
        self.answer_prefix = answer_prefix;
        self.answer_gap = answer_gap;
        self
    }

    /// Enables printing the accumulated transcript on exit.
    pub fn with_print_transcript(mut self, print_transcript: bool) -> Self {
        self.print_transcript = print_transcript;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the top-k value.
    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the per-answer token cap.
    pub fn with_num_predict(mut self, num_predict: Option<i32>) -> Self {
        self.num_predict = num_predict;
        self
    }

    /// Sets the stop sequences.
    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = stop_sequences;
        self
    }

    /// The banner to print at session start.
    pub fn banner(&self) -> String {
        match &self.banner {
            Some(banner) => banner.clone(),
            None => format!(
                "Welcome to the {} chatbot. Type '{}' to quit.",
                self.model, self.exit_word
            ),
        }
    }

    /// The sampler options implied by this configuration, if any are set.
    pub fn generate_options(&self) -> Option<GenerateOptions> {
        let mut options = GenerateOptions::new();
        options.temperature = self.temperature;
        options.top_p = self.top_p;
        options.top_k = self.top_k;
        options.num_predict = self.num_predict;
        if !self.stop_sequences.is_empty() {
            options.stop = Some(self.stop_sequences.clone());
        }
        if options.is_empty() { None } else { Some(options) }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig::new().apply(args)
    }
}

/// On-disk configuration file contents. Every key is optional; unset keys
/// fall back to the defaults of [`ChatConfig::new`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct ChatConfigFile {
    model: Option<String>,
    host: Option<String>,
    template: Option<String>,
    seed: Option<String>,
    seed_label: Option<String>,
    exit_word: Option<String>,
    banner: Option<String>,
    answer_prefix: Option<String>,
    answer_gap: Option<bool>,
    print_transcript: Option<bool>,
    use_color: Option<bool>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    top_k: Option<u32>,
    num_predict: Option<i32>,
    stop_sequences: Option<Vec<String>>,
}

impl ChatConfigFile {
    fn into_config(self) -> ChatConfig {
        let mut config = ChatConfig::new();
        if let Some(model) = self.model {
            config.model = Model::from(model);
        }
        config.host = self.host.or(config.host);
        config.template = self.template.or(config.template);
        config.seed = self.seed.or(config.seed);
        if let Some(seed_label) = self.seed_label {
            config.seed_label = seed_label;
        }
        if let Some(exit_word) = self.exit_word {
            config.exit_word = exit_word;
        }
        config.banner = self.banner.or(config.banner);
        if let Some(answer_prefix) = self.answer_prefix {
            config.answer_prefix = answer_prefix;
        }
        if let Some(answer_gap) = self.answer_gap {
            config.answer_gap = answer_gap;
        }
        if let Some(print_transcript) = self.print_transcript {
            config.print_transcript = print_transcript;
        }
        if let Some(use_color) = self.use_color {
            config.use_color = use_color;
        }
        config.temperature = self.temperature.or(config.temperature);
        config.top_p = self.top_p.or(config.top_p);
        config.top_k = self.top_k.or(config.top_k);
        config.num_predict = self.num_predict.or(config.num_predict);
        if let Some(stop_sequences) = self.stop_sequences {
            config.stop_sequences = stop_sequences;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, Model::Known(KnownModel::Llama31));
        assert_eq!(config.seed_label, "data");
        assert_eq!(config.exit_word, "exit");
        assert_eq!(config.answer_prefix, "AI: ");
        assert!(config.answer_gap);
        assert!(config.use_color);
        assert!(!config.print_transcript);
        assert!(config.seed.is_none());
        assert!(config.template.is_none());
        assert!(config.banner.is_none());
        assert!(config.generate_options().is_none());
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = ChatConfig::from(args);
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            config: None,
            host: Some("http://10.0.0.5:11434".to_string()),
            model: Some("neural-chat".to_string()),
            seed: Some("hello".to_string()),
            seed_label: Some("questions".to_string()),
            exit_word: Some("quit".to_string()),
            no_color: true,
            print_transcript: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.model, Model::Known(KnownModel::NeuralChat));
        assert_eq!(config.host.as_deref(), Some("http://10.0.0.5:11434"));
        assert_eq!(config.seed.as_deref(), Some("hello"));
        assert_eq!(config.seed_label, "questions");
        assert_eq!(config.exit_word, "quit");
        assert!(!config.use_color);
        assert!(config.print_transcript);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model(Model::Known(KnownModel::NeuralChat))
            .with_template("{context}{question}".to_string())
            .with_seed("hello".to_string())
            .with_seed_label("questions".to_string())
            .with_exit_word("done".to_string())
            .with_banner("hi".to_string())
            .with_answer_style("AI chatbot: ".to_string(), false)
            .with_print_transcript(true)
            .without_color()
            .with_temperature(Some(0.5))
            .with_top_p(Some(0.9))
            .with_top_k(Some(64))
            .with_num_predict(Some(256))
            .with_stop_sequences(vec!["User:".to_string()]);

        assert_eq!(config.model, Model::Known(KnownModel::NeuralChat));
        assert_eq!(config.template.as_deref(), Some("{context}{question}"));
        assert_eq!(config.seed.as_deref(), Some("hello"));
        assert_eq!(config.seed_label, "questions");
        assert_eq!(config.exit_word, "done");
        assert_eq!(config.banner.as_deref(), Some("hi"));
        assert_eq!(config.answer_prefix, "AI chatbot: ");
        assert!(!config.answer_gap);
        assert!(config.print_transcript);
        assert!(!config.use_color);

        let options = config.generate_options().unwrap();
        assert_eq!(options.temperature, Some(0.5));
        assert_eq!(options.top_p, Some(0.9));
        assert_eq!(options.top_k, Some(64));
        assert_eq!(options.num_predict, Some(256));
        assert_eq!(options.stop, Some(vec!["User:".to_string()]));
    }

    #[test]
    fn derived_banner_names_model_and_exit_word() {
        let config = ChatConfig::new();
        assert_eq!(
            config.banner(),
            "Welcome to the llama3.1 chatbot. Type 'exit' to quit."
        );

        let config = ChatConfig::new().with_banner("custom".to_string());
        assert_eq!(config.banner(), "custom");
    }

    #[test]
    fn config_file_merges_over_defaults() {
        let yaml = r#"
model: neural-chat
seed_label: questions
answer_gap: false
temperature: 0.25
stop_sequences:
  - "User:"
"#;
        let file: ChatConfigFile = serde_yaml::from_str(yaml).unwrap();
        let config = file.into_config();
        assert_eq!(config.model, Model::Known(KnownModel::NeuralChat));
        assert_eq!(config.seed_label, "questions");
        assert!(!config.answer_gap);
        assert_eq!(config.temperature, Some(0.25));
        assert_eq!(config.stop_sequences, vec!["User:".to_string()]);
        // Unset keys keep their defaults.
        assert_eq!(config.exit_word, "exit");
        assert_eq!(config.answer_prefix, "AI: ");
    }

    #[test]
    fn args_override_file_values() {
        let file: ChatConfigFile = serde_yaml::from_str("model: neural-chat\n").unwrap();
        let args = ChatArgs {
            model: Some("mistral".to_string()),
            ..ChatArgs::default()
        };
        let config = file.into_config().apply(args);
        assert_eq!(config.model, Model::Known(KnownModel::Mistral));
    }
}
