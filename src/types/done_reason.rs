use std::fmt;

use serde::{Deserialize, Serialize};

/// The reason a completed response stopped generating.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoneReason {
    /// Generation reached a natural stop point or a stop sequence.
    Stop,

    /// Generation hit the requested token limit.
    Length,

    /// The request only loaded the model into memory.
    Load,

    /// The request unloaded the model from memory.
    Unload,
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoneReason::Stop => write!(f, "stop"),
            DoneReason::Length => write!(f, "length"),
            DoneReason::Load => write!(f, "load"),
            DoneReason::Unload => write!(f, "unload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization() {
        assert_eq!(serde_json::to_string(&DoneReason::Stop).unwrap(), r#""stop""#);
        assert_eq!(
            serde_json::to_string(&DoneReason::Length).unwrap(),
            r#""length""#
        );
    }

    #[test]
    fn deserialization() {
        let reason: DoneReason = serde_json::from_str(r#""stop""#).unwrap();
        assert_eq!(reason, DoneReason::Stop);
        let reason: DoneReason = serde_json::from_str(r#""unload""#).unwrap();
        assert_eq!(reason, DoneReason::Unload);
    }
}
