use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::DoneReason;
use crate::utils::time::nanos_to_seconds;

/// A completion returned by `api/generate`.
///
/// Non-streaming requests produce one of these with the full answer in
/// `response`. Streaming requests produce a sequence of them, each carrying
/// a fragment of the answer, with the timing and token-count fields present
/// only on the final chunk (`done == true`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The model that generated the completion.
    pub model: String,

    /// When the server created this response.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,

    /// The answer text, or a fragment of it when streaming.
    pub response: String,

    /// Whether generation has finished.
    pub done: bool,

    /// Why generation stopped. Present only when `done` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<DoneReason>,

    /// Opaque encoding of the conversation so far, suitable for resending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<u32>>,

    /// Total wall-clock time spent on the request, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,

    /// Time spent loading the model, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,

    /// Number of tokens in the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,

    /// Time spent evaluating the prompt, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_duration: Option<u64>,

    /// Number of tokens in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,

    /// Time spent generating the response, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
}

impl GenerateResponse {
    /// Total request duration in seconds, if the server reported it.
    pub fn total_duration_seconds(&self) -> Option<f64> {
        self.total_duration.map(nanos_to_seconds)
    }

    /// Generation rate in tokens per second, if the server reported the
    /// counts needed to compute it.
    pub fn eval_rate(&self) -> Option<f64> {
        match (self.eval_count, self.eval_duration) {
            (Some(count), Some(duration)) if duration > 0 => {
                Some(count as f64 / nanos_to_seconds(duration))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_response_deserialization() {
        let json = r#"{
            "model": "llama3.1",
            "created_at": "2023-08-04T19:22:45.499127Z",
            "response": "The sky is blue because of Rayleigh scattering.",
            "done": true,
            "done_reason": "stop",
            "context": [1, 2, 3],
            "total_duration": 5043500667,
            "load_duration": 5025959,
            "prompt_eval_count": 26,
            "prompt_eval_duration": 325953000,
            "eval_count": 290,
            "eval_duration": 4709213000
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.model, "llama3.1");
        assert!(response.done);
        assert_eq!(response.done_reason, Some(DoneReason::Stop));
        assert_eq!(response.context, Some(vec![1, 2, 3]));
        assert_eq!(response.prompt_eval_count, Some(26));
        assert_eq!(response.eval_count, Some(290));
    }

    #[test]
    fn stream_chunk_deserialization() {
        // Intermediate chunks carry only the fragment.
        let json = r#"{
            "model": "llama3.1",
            "created_at": "2023-08-04T08:52:19.385406455-07:00",
            "response": "The",
            "done": false
        }"#;
        let chunk: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.response, "The");
        assert!(!chunk.done);
        assert!(chunk.done_reason.is_none());
        assert!(chunk.eval_count.is_none());
    }

    #[test]
    fn duration_helpers() {
        let json = r#"{
            "model": "llama3.1",
            "created_at": "2023-08-04T19:22:45.499127Z",
            "response": "hi",
            "done": true,
            "total_duration": 2000000000,
            "eval_count": 100,
            "eval_duration": 4000000000
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_duration_seconds(), Some(2.0));
        assert_eq!(response.eval_rate(), Some(25.0));
    }

    #[test]
    fn eval_rate_absent_without_counts() {
        let json = r#"{
            "model": "llama3.1",
            "created_at": "2023-08-04T19:22:45.499127Z",
            "response": "hi",
            "done": false
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert!(response.eval_rate().is_none());
        assert!(response.total_duration_seconds().is_none());
    }
}
