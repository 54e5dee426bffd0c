use serde::{Deserialize, Serialize};

use crate::types::ModelInfo;

/// The list of installed models returned by `api/tags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelListResponse {
    /// The installed models.
    pub models: Vec<ModelInfo>,
}

impl ModelListResponse {
    /// Returns true if a model with the given name (or `name:latest`) is
    /// installed.
    pub fn contains(&self, name: &str) -> bool {
        self.models
            .iter()
            .any(|m| m.name == name || m.name == format!("{name}:latest"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_deserialization() {
        let json = r#"{
            "models": [
                {
                    "name": "llama3.1:latest",
                    "modified_at": "2024-07-23T14:05:00Z",
                    "size": 4661224676,
                    "digest": "42182419e950"
                },
                {
                    "name": "neural-chat:latest",
                    "modified_at": "2024-01-12T09:30:00Z",
                    "size": 4108928574,
                    "digest": "89fa737d3b85"
                }
            ]
        }"#;
        let list: ModelListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(list.models.len(), 2);
        assert!(list.contains("llama3.1"));
        assert!(list.contains("neural-chat:latest"));
        assert!(!list.contains("mistral"));
    }
}
