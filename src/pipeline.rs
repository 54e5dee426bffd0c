//! Request pipelines: a prompt template composed with a model invocation.
//!
//! A [`Pipeline`] binds a [`PromptTemplate`], a [`Model`], and a
//! [`CompletionBackend`] into one callable unit. The chat loop invokes it
//! with two named values, the accumulated context and the current question,
//! and receives the model's completion.

use async_trait::async_trait;

use crate::client::Ollama;
use crate::error::Result;
use crate::template::PromptTemplate;
use crate::types::{GenerateOptions, GenerateRequest, GenerateResponse, Model};

/// The model-invocation capability behind a pipeline.
///
/// [`Ollama`] is the production implementation; tests substitute their own.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion request to completion.
    async fn complete(&self, request: GenerateRequest) -> Result<GenerateResponse>;
}

#[async_trait]
impl CompletionBackend for Ollama {
    async fn complete(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        self.generate(request).await
    }
}

#[async_trait]
impl<B: CompletionBackend + ?Sized> CompletionBackend for std::sync::Arc<B> {
    async fn complete(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        (**self).complete(request).await
    }
}

/// A prompt template and a model invocation handle composed into one
/// callable request unit.
pub struct Pipeline<B: CompletionBackend> {
    backend: B,
    model: Model,
    template: PromptTemplate,
    options: Option<GenerateOptions>,
}

impl<B: CompletionBackend> Pipeline<B> {
    /// Creates a new pipeline.
    pub fn new(backend: B, model: Model, template: PromptTemplate) -> Self {
        Self {
            backend,
            model,
            template,
            options: None,
        }
    }

    /// Sets sampler options supplied on every request.
    pub fn with_options(mut self, options: Option<GenerateOptions>) -> Self {
        self.options = options;
        self
    }

    /// The model this pipeline invokes.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The template this pipeline renders.
    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Invokes the pipeline with the given context and question.
    ///
    /// The template is rendered with exactly these two named values and the
    /// rendered prompt is forwarded to the backend. Errors from the backend
    /// propagate unclassified; nothing is retried.
    pub async fn invoke(&self, context: &str, question: &str) -> Result<GenerateResponse> {
        let prompt = self
            .template
            .render(&[("context", context), ("question", question)])?;
        let mut request = GenerateRequest::new(self.model.clone(), prompt);
        if let Some(options) = &self.options {
            request = request.with_options(options.clone());
        }
        self.backend.complete(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use time::OffsetDateTime;

    use super::*;
    use crate::error::Error;
    use crate::types::KnownModel;

    struct RecordingBackend {
        requests: Mutex<Vec<GenerateRequest>>,
        answer: String,
    }

    impl RecordingBackend {
        fn new(answer: &str) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                answer: answer.to_string(),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for RecordingBackend {
        async fn complete(&self, request: GenerateRequest) -> Result<GenerateResponse> {
            let model = request.model.to_string();
            self.requests.lock().unwrap().push(request);
            Ok(GenerateResponse {
                model,
                created_at: OffsetDateTime::UNIX_EPOCH,
                response: self.answer.clone(),
                done: true,
                done_reason: None,
                context: None,
                total_duration: None,
                load_duration: None,
                prompt_eval_count: None,
                prompt_eval_duration: None,
                eval_count: None,
                eval_duration: None,
            })
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl CompletionBackend for FailingBackend {
        async fn complete(&self, _: GenerateRequest) -> Result<GenerateResponse> {
            Err(Error::connection("connection refused", None))
        }
    }

    #[test]
    fn invoke_renders_template_and_forwards() {
        let backend = RecordingBackend::new("ok");
        let template = PromptTemplate::new("{context}|{question}").unwrap();
        let pipeline = Pipeline::new(backend, Model::Known(KnownModel::Llama31), template);

        let response =
            tokio_test::block_on(pipeline.invoke("data: hello", "hi")).unwrap();
        assert_eq!(response.response, "ok");

        let requests = pipeline.backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "data: hello|hi");
        assert_eq!(requests[0].model, Model::Known(KnownModel::Llama31));
        assert!(!requests[0].stream);
    }

    #[test]
    fn invoke_passes_options() {
        let backend = RecordingBackend::new("ok");
        let template = PromptTemplate::new("{context}{question}").unwrap();
        let pipeline = Pipeline::new(backend, Model::Known(KnownModel::NeuralChat), template)
            .with_options(Some(GenerateOptions::new().with_temperature(0.5)));

        tokio_test::block_on(pipeline.invoke("", "q")).unwrap();

        let requests = pipeline.backend.requests.lock().unwrap();
        assert_eq!(
            requests[0].options.as_ref().unwrap().temperature,
            Some(0.5)
        );
    }

    #[test]
    fn backend_errors_propagate() {
        let template = PromptTemplate::new("{context}{question}").unwrap();
        let pipeline = Pipeline::new(FailingBackend, Model::Known(KnownModel::Llama31), template);

        let err = tokio_test::block_on(pipeline.invoke("", "hi")).unwrap_err();
        assert!(err.is_connection());
    }

    #[test]
    fn template_errors_surface_before_the_backend_is_called() {
        let backend = RecordingBackend::new("ok");
        // A slot the pipeline never supplies.
        let template = PromptTemplate::new("{history}").unwrap();
        let pipeline = Pipeline::new(backend, Model::Known(KnownModel::Llama31), template);

        let err = tokio_test::block_on(pipeline.invoke("c", "q")).unwrap_err();
        assert!(err.is_template());
        assert!(pipeline.backend.requests.lock().unwrap().is_empty());
    }
}
