use serde::{Deserialize, Serialize};

use crate::types::{GenerateOptions, Model};

/// Parameters for a completion request against `api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The model that generates the completion.
    pub model: Model,

    /// The fully rendered prompt text.
    pub prompt: String,

    /// Whether the server streams the response as it is generated.
    ///
    /// The server defaults to streaming when this is omitted, so it is
    /// always serialized.
    pub stream: bool,

    /// System prompt overriding the one in the model's Modelfile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Prompt template overriding the one in the model's Modelfile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Bypass templating entirely and pass the prompt through raw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,

    /// How long the model stays loaded after the request, e.g. "5m".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,

    /// Sampler options for this request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

impl GenerateRequest {
    /// Create a new non-streaming request with the given model and prompt.
    pub fn new(model: Model, prompt: impl Into<String>) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            stream: false,
            system: None,
            template: None,
            raw: None,
            keep_alive: None,
            options: None,
        }
    }

    /// Sets the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the server-side prompt template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Requests raw prompting without the model's template.
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Sets the keep-alive duration.
    pub fn with_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    /// Sets the sampler options.
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = Some(options);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;
    use serde_json::{json, to_value};

    #[test]
    fn minimal_request_serialization() {
        let request = GenerateRequest::new(Model::Known(KnownModel::Llama31), "Why is the sky blue?");
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "model": "llama3.1",
                "prompt": "Why is the sky blue?",
                "stream": false
            })
        );
    }

    #[test]
    fn full_request_serialization() {
        let request = GenerateRequest::new(Model::Known(KnownModel::NeuralChat), "hello")
            .with_system("Answer briefly.")
            .with_keep_alive("5m")
            .with_options(GenerateOptions::new().with_top_k(20));
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "model": "neural-chat",
                "prompt": "hello",
                "stream": false,
                "system": "Answer briefly.",
                "keep_alive": "5m",
                "options": {"top_k": 20}
            })
        );
    }

    #[test]
    fn deserialization() {
        let json = json!({
            "model": "llama3.1",
            "prompt": "hi",
            "stream": true
        });
        let request: GenerateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.model, Model::Known(KnownModel::Llama31));
        assert_eq!(request.prompt, "hi");
        assert!(request.stream);
        assert!(request.options.is_none());
    }
}
