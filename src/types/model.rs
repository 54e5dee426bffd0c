use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents an Ollama model identifier.
///
/// This can be a well-known library model or a custom string value for
/// models pulled from elsewhere (including tagged variants like
/// `llama3.1:70b`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known library models
    Known(KnownModel),

    /// Custom model identifier (tagged variants, private models)
    Custom(String),
}

/// Well-known Ollama library models
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Llama 3.1
    #[serde(rename = "llama3.1")]
    Llama31,

    /// Llama 3.2
    #[serde(rename = "llama3.2")]
    Llama32,

    /// Llama 3
    #[serde(rename = "llama3")]
    Llama3,

    /// Llama 2
    #[serde(rename = "llama2")]
    Llama2,

    /// Intel neural-chat
    #[serde(rename = "neural-chat")]
    NeuralChat,

    /// Mistral 7B
    #[serde(rename = "mistral")]
    Mistral,

    /// Mixtral 8x7B
    #[serde(rename = "mixtral")]
    Mixtral,

    /// Phi-3
    #[serde(rename = "phi3")]
    Phi3,

    /// Gemma 2
    #[serde(rename = "gemma2")]
    Gemma2,

    /// Qwen 2.5
    #[serde(rename = "qwen2.5")]
    Qwen25,

    /// Code Llama
    #[serde(rename = "codellama")]
    CodeLlama,
}

impl KnownModel {
    /// The model's name as the server knows it.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Llama31 => "llama3.1",
            KnownModel::Llama32 => "llama3.2",
            KnownModel::Llama3 => "llama3",
            KnownModel::Llama2 => "llama2",
            KnownModel::NeuralChat => "neural-chat",
            KnownModel::Mistral => "mistral",
            KnownModel::Mixtral => "mixtral",
            KnownModel::Phi3 => "phi3",
            KnownModel::Gemma2 => "gemma2",
            KnownModel::Qwen25 => "qwen2.5",
            KnownModel::CodeLlama => "codellama",
        }
    }

    fn from_name(name: &str) -> Option<KnownModel> {
        match name {
            "llama3.1" => Some(KnownModel::Llama31),
            "llama3.2" => Some(KnownModel::Llama32),
            "llama3" => Some(KnownModel::Llama3),
            "llama2" => Some(KnownModel::Llama2),
            "neural-chat" => Some(KnownModel::NeuralChat),
            "mistral" => Some(KnownModel::Mistral),
            "mixtral" => Some(KnownModel::Mixtral),
            "phi3" => Some(KnownModel::Phi3),
            "gemma2" => Some(KnownModel::Gemma2),
            "qwen2.5" => Some(KnownModel::Qwen25),
            "codellama" => Some(KnownModel::CodeLlama),
            _ => None,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        match KnownModel::from_name(model) {
            Some(known) => Model::Known(known),
            None => Model::Custom(model.to_string()),
        }
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        match KnownModel::from_name(&model) {
            Some(known) => Model::Known(known),
            None => Model::Custom(model),
        }
    }
}
