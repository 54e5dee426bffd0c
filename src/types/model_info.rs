use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Metadata about a model installed on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// The model's name, including its tag, e.g. `llama3.1:latest`.
    pub name: String,

    /// When the model was last modified.
    #[serde(with = "crate::utils::time")]
    pub modified_at: OffsetDateTime,

    /// On-disk size in bytes.
    pub size: u64,

    /// Content digest of the model blob.
    pub digest: String,

    /// Architecture and quantization details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ModelDetails>,
}

/// Architecture and quantization details for an installed model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDetails {
    /// Blob format, e.g. `gguf`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Primary model family, e.g. `llama`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// All families the model belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub families: Option<Vec<String>>,

    /// Parameter count label, e.g. `8B`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_size: Option<String>,

    /// Quantization label, e.g. `Q4_0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_level: Option<String>,
}
